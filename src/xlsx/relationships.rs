use std::collections::BTreeMap;
use std::io::BufRead;

use log::trace;
use quick_xml::{events::Event, name::QName, Reader as XmlReader};

use super::XlsxError;

const HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const HYPERLINK_STRICT: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships/hyperlink";

/// Name of the part holding the relationships of `part`
///
/// ```
/// use xlgrid::relationships_part_name;
///
/// assert_eq!(
///     relationships_part_name("xl/worksheets/sheet1.xml"),
///     "xl/worksheets/_rels/sheet1.xml.rels"
/// );
/// ```
pub fn relationships_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, base)) => format!("{dir}/_rels/{base}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// External hyperlink targets of a worksheet, keyed by relationship id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    targets: BTreeMap<String, String>,
}

impl Relationships {
    /// Target of relationship `id`
    pub fn get(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(|t| t.as_str())
    }

    /// Adds or replaces a target
    pub fn insert(&mut self, id: impl Into<String>, target: impl Into<String>) {
        self.targets.insert(id.into(), target.into());
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// No targets at all
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Reads the external hyperlinks of a relationships part.
    ///
    /// Targets read before an error are kept.
    pub fn read_hyperlinks<R: BufRead>(
        &mut self,
        xml: &mut XmlReader<R>,
    ) -> Result<(), XlsxError> {
        let mut buf = Vec::with_capacity(64);
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"Relationship" => {
                    let mut id = String::new();
                    let mut target = String::new();
                    let mut kind = String::new();
                    let mut external = false;
                    for a in e.attributes() {
                        let a = a.map_err(XlsxError::XmlAttr)?;
                        match a.key {
                            QName(b"Id") => {
                                id = a.decode_and_unescape_value(xml.decoder())?.into_owned()
                            }
                            QName(b"Target") => {
                                target = a.decode_and_unescape_value(xml.decoder())?.into_owned()
                            }
                            QName(b"Type") => {
                                kind = a.decode_and_unescape_value(xml.decoder())?.into_owned()
                            }
                            QName(b"TargetMode") => external = a.value.as_ref() == b"External",
                            _ => (),
                        }
                    }
                    if external && (kind == HYPERLINK || kind == HYPERLINK_STRICT) {
                        self.targets.insert(id, target);
                    } else {
                        trace!("skipping relationship '{id}' of type '{kind}'");
                    }
                }
                Ok(Event::Eof) => return Ok(()),
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => (),
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Relationships {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Relationships {
            targets: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
