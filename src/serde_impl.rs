use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{DownlevelName, SecurityIdentifier};

impl Serialize for SecurityIdentifier {
    /// `S-1-...` string for human readable formats, Windows binary layout otherwise.
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

// Generic helper to deserialize types that support FromStr and TryFrom<&[u8]>
fn deserialize_sid_like<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    for<'a> T: FromStr + TryFrom<&'a [u8]>,
{
    struct Visitor<T> {
        _marker: PhantomData<T>,
    }

    impl<T> de::Visitor<'_> for Visitor<T>
    where
        for<'a> T: FromStr + TryFrom<&'a [u8]>,
    {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a Windows SID as a string (e.g., \"S-1-...\") or as raw binary")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::from_str(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Bytes(v), &self))
        }
    }

    let visitor = Visitor::<T> {
        _marker: PhantomData,
    };
    if deserializer.is_human_readable() {
        deserializer.deserialize_str(visitor)
    } else {
        deserializer.deserialize_bytes(visitor)
    }
}

impl<'de> Deserialize<'de> for SecurityIdentifier {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_sid_like(deserializer)
    }
}

impl Serialize for DownlevelName {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DownlevelName {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DownlevelNameVisitor;

        impl de::Visitor<'_> for DownlevelNameVisitor {
            type Value = DownlevelName;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a downlevel account name in the format 'DOMAIN\\user'")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                DownlevelName::from_str(v)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(DownlevelNameVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod test {
    use crate::{DownlevelName, SecurityIdentifier};
    use serde_test::{Configure, Token};

    const BYTES: &[u8] = &[1, 3, 0, 0, 0, 0, 0, 5, 5, 0, 0, 0, 32, 0, 0, 0, 32, 2, 0, 0];

    fn sid() -> SecurityIdentifier {
        "S-1-5-5-32-544".parse().unwrap()
    }

    #[test]
    fn test_binary() {
        serde_test::assert_tokens(&sid().compact(), &[Token::Bytes(BYTES)]);
    }

    #[test]
    fn test_human() {
        serde_test::assert_tokens(&sid().readable(), &[Token::String("S-1-5-5-32-544")]);
    }

    #[test]
    fn json_round_trip() {
        let json = serde_json::to_string(&sid()).unwrap();
        assert_eq!(json, "\"S-1-5-5-32-544\"");
        let back: SecurityIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sid());
    }

    #[test]
    fn downlevel_name_as_string() {
        let name: DownlevelName = "CONTOSO\\alice".parse().unwrap();
        serde_test::assert_tokens(&name, &[Token::String("CONTOSO\\alice")]);
        assert!(serde_json::from_str::<DownlevelName>("\"no-separator\"").is_err());
    }
}
