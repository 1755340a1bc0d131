use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Kind of account a SID names, as reported by account lookups.
/// # see also
/// See Microsoft docs for [SID_NAME_USE](https://learn.microsoft.com/en-us/windows/win32/api/winnt/ne-winnt-sid_name_use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum SidType {
    /// A user account.
    User = 1,
    /// A group account.
    Group = 2,
    /// A domain.
    Domain = 3,
    /// An alias (local group).
    Alias = 4,
    /// A well-known group (e.g., Everyone, LocalSystem).
    WellKnownGroup = 5,
    /// A deleted account.
    DeletedAccount = 6,
    /// Not a valid account.
    Invalid = 7,
    /// Type could not be determined.
    Unknown = 8,
    /// A computer (machine account).
    Computer = 9,
    /// A mandatory integrity label.
    Label = 10,
    /// A logon session.
    LogonSession = 11,
}
