//! Output sinks for identity serialization.

use std::io;

/// Namespace of the addressing identity extension elements.
pub const IDENTITY_EXTENSION_NAMESPACE: &str =
    "http://schemas.xmlsoap.org/ws/2006/02/addressingidentity";

/// Local name of the UPN identity element.
pub const UPN_ELEMENT: &str = "Upn";

/// A structured writer able to emit a namespaced string element.
///
/// Escaping of `value` is the writer's job.
pub trait ElementWriter {
    /// Error raised by the underlying output.
    type Error;

    /// Writes `<local_name xmlns="namespace">value</local_name>` or its
    /// equivalent in the writer's format.
    ///
    /// # Errors
    /// Whatever the underlying output reports.
    fn write_element_string(
        &mut self,
        local_name: &str,
        namespace: &str,
        value: &str,
    ) -> Result<(), Self::Error>;
}

/// [`ElementWriter`] emitting XML text into any [`io::Write`].
///
/// The namespace and the value are escaped. `local_name` is written verbatim
/// and must already be a valid XML name, such as [`UPN_ELEMENT`].
///
/// ```rust
/// # use upn_endpoint_identity::{ElementWriter, XmlElementWriter};
/// let mut writer = XmlElementWriter::new(Vec::new());
/// writer.write_element_string("Upn", "urn:x", "a&b@x.com")?;
/// assert_eq!(writer.into_inner(), b"<Upn xmlns=\"urn:x\">a&amp;b@x.com</Upn>");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct XmlElementWriter<W> {
    inner: W,
}

impl<W: io::Write> XmlElementWriter<W> {
    /// Wraps `inner`.
    #[inline]
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped output.
    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }

    // Attribute values and text content only, never names.
    fn write_escaped(&mut self, text: &str) -> io::Result<()> {
        let mut last = 0;
        for (index, ch) in text.char_indices() {
            let entity = match ch {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&apos;",
                _ => continue,
            };
            self.inner.write_all(text.get(last..index).unwrap_or_default().as_bytes())?;
            self.inner.write_all(entity.as_bytes())?;
            last = index + ch.len_utf8();
        }
        self.inner.write_all(text.get(last..).unwrap_or_default().as_bytes())
    }
}

impl<W: io::Write> ElementWriter for XmlElementWriter<W> {
    type Error = io::Error;

    #[inline]
    fn write_element_string(
        &mut self,
        local_name: &str,
        namespace: &str,
        value: &str,
    ) -> Result<(), Self::Error> {
        write!(self.inner, "<{local_name} xmlns=\"")?;
        self.write_escaped(namespace)?;
        self.inner.write_all(b"\">")?;
        self.write_escaped(value)?;
        write!(self.inner, "</{local_name}>")
    }
}
