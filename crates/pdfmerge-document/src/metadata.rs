// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document metadata — the classic /Info dictionary and the XMP packet with
// PDF/A-1b identification, both derived from one `MergeMetadata` value.
//
// PDF/A validators compare the two representations field by field; deriving
// both from the same value keeps them identical.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use lopdf::{Dictionary, Object, Stream, StringFormat, dictionary};
use pdfmerge_core::{MergeConfig, MetadataError};
use quick_xml::escape::escape;
use tracing::{debug, instrument};

const NS_X: &str = "adobe:ns:meta/";
const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const NS_XMP: &str = "http://ns.adobe.com/xap/1.0/";
const NS_PDFAID: &str = "http://www.aiim.org/pdfa/ns/id/";

/// Fixed packet id from the XMP specification.
const XPACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

/// PDF/A-1b identification.
pub const PDFA_PART: u8 = 1;
pub const PDFA_CONFORMANCE: &str = "B";

/// Title, creator and subject of a merge, stamped with the time it was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMetadata {
    pub title: String,
    pub creator: String,
    pub subject: String,
    pub created: DateTime<Utc>,
}

impl MergeMetadata {
    pub fn new(
        title: impl Into<String>,
        creator: impl Into<String>,
        subject: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            creator: creator.into(),
            subject: subject.into(),
            created,
        }
    }

    pub fn from_config(config: &MergeConfig, created: DateTime<Utc>) -> Self {
        Self::new(
            config.title.clone(),
            config.creator.clone(),
            config.subject.clone(),
            created,
        )
    }

    /// Derive the document-info representation.
    pub fn to_classic_info(&self) -> Result<ClassicInfo, MetadataError> {
        self.validate()?;
        Ok(ClassicInfo {
            title: self.title.clone(),
            creator: self.creator.clone(),
            subject: self.subject.clone(),
        })
    }

    /// Derive and serialise the XMP representation.
    pub fn to_xmp_packet(&self) -> Result<XmpPacket, MetadataError> {
        self.validate()?;
        let xml = render_xmp(self)
            .map_err(|err| MetadataError::Serialization(format!("write failed: {err}")))?;
        Ok(XmpPacket { xml })
    }

    fn validate(&self) -> Result<(), MetadataError> {
        check_field("title", &self.title)?;
        check_field("creator", &self.creator)?;
        check_field("subject", &self.subject)
    }
}

/// Builds both metadata representations in one step.
pub struct MetadataBuilder;

impl MetadataBuilder {
    #[instrument(skip_all, fields(title = %metadata.title))]
    pub fn build(metadata: &MergeMetadata) -> Result<(ClassicInfo, XmpPacket), MetadataError> {
        let info = metadata.to_classic_info()?;
        let xmp = metadata.to_xmp_packet()?;
        debug!(xmp_bytes = xmp.as_bytes().len(), "Metadata built");
        Ok((info, xmp))
    }
}

/// Entries of the document-info dictionary. No dates are written here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicInfo {
    pub title: String,
    pub creator: String,
    pub subject: String,
}

impl ClassicInfo {
    pub fn to_dictionary(&self) -> Dictionary {
        dictionary! {
            "Title" => text_string(&self.title),
            "Creator" => text_string(&self.creator),
            "Subject" => text_string(&self.subject),
        }
    }
}

/// A serialised XMP packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpPacket {
    xml: String,
}

impl XmpPacket {
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.xml.as_bytes()
    }

    /// The catalog /Metadata stream. PDF/A-1 requires it unfiltered.
    pub fn to_stream(&self) -> Stream {
        let mut stream = Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            self.xml.as_bytes().to_vec(),
        );
        stream.allows_compression = false;
        stream
    }
}

fn render_xmp(metadata: &MergeMetadata) -> Result<String, std::fmt::Error> {
    let date = metadata.created.to_rfc3339_opts(SecondsFormat::Secs, true);
    let title = escape(&metadata.title);
    let creator = escape(&metadata.creator);
    let subject = escape(&metadata.subject);

    let mut xml = String::new();
    writeln!(xml, "<?xpacket begin=\"\u{feff}\" id=\"{XPACKET_ID}\"?>")?;
    writeln!(xml, "<x:xmpmeta xmlns:x=\"{NS_X}\">")?;
    writeln!(xml, "  <rdf:RDF xmlns:rdf=\"{NS_RDF}\">")?;

    writeln!(xml, "    <rdf:Description rdf:about=\"\" xmlns:pdfaid=\"{NS_PDFAID}\">")?;
    writeln!(xml, "      <pdfaid:part>{PDFA_PART}</pdfaid:part>")?;
    writeln!(xml, "      <pdfaid:conformance>{PDFA_CONFORMANCE}</pdfaid:conformance>")?;
    writeln!(xml, "    </rdf:Description>")?;

    writeln!(xml, "    <rdf:Description rdf:about=\"\" xmlns:dc=\"{NS_DC}\">")?;
    writeln!(xml, "      <dc:format>application/pdf</dc:format>")?;
    writeln!(xml, "      <dc:title>")?;
    writeln!(xml, "        <rdf:Alt><rdf:li xml:lang=\"x-default\">{title}</rdf:li></rdf:Alt>")?;
    writeln!(xml, "      </dc:title>")?;
    writeln!(xml, "      <dc:creator>")?;
    writeln!(xml, "        <rdf:Seq><rdf:li>{creator}</rdf:li></rdf:Seq>")?;
    writeln!(xml, "      </dc:creator>")?;
    writeln!(xml, "      <dc:description>")?;
    writeln!(xml, "        <rdf:Alt><rdf:li xml:lang=\"x-default\">{subject}</rdf:li></rdf:Alt>")?;
    writeln!(xml, "      </dc:description>")?;
    writeln!(xml, "    </rdf:Description>")?;

    writeln!(xml, "    <rdf:Description rdf:about=\"\" xmlns:xmp=\"{NS_XMP}\">")?;
    writeln!(xml, "      <xmp:CreateDate>{date}</xmp:CreateDate>")?;
    writeln!(xml, "      <xmp:ModifyDate>{date}</xmp:ModifyDate>")?;
    writeln!(xml, "      <xmp:MetadataDate>{date}</xmp:MetadataDate>")?;
    writeln!(xml, "      <xmp:CreatorTool>{creator}</xmp:CreatorTool>")?;
    writeln!(xml, "    </rdf:Description>")?;

    writeln!(xml, "  </rdf:RDF>")?;
    writeln!(xml, "</x:xmpmeta>")?;
    write!(xml, "<?xpacket end=\"w\"?>")?;
    Ok(xml)
}

/// Characters XML 1.0 cannot carry at all, escaped or not.
fn check_field(field: &'static str, value: &str) -> Result<(), MetadataError> {
    match value.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(MetadataError::InvalidField {
            field,
            reason: format!("character U+{:04X} is not allowed in XML", u32::from(c)),
        }),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

/// Encode a PDF text string: ASCII as a literal string, anything else as
/// UTF-16BE with a byte-order mark.
pub fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::decode_text_string;
    use chrono::TimeZone;
    use quick_xml::Reader;
    use quick_xml::escape::unescape;
    use quick_xml::events::Event;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    fn between<'a>(xml: &'a str, open: &str, close: &str) -> &'a str {
        let start = xml.find(open).unwrap() + open.len();
        let end = start + xml[start..].find(close).unwrap();
        &xml[start..end]
    }

    fn dc_alt(xml: &str, element: &str) -> String {
        let block = between(xml, &format!("<dc:{element}>"), &format!("</dc:{element}>"));
        between(block, "<rdf:li xml:lang=\"x-default\">", "</rdf:li>").to_string()
    }

    fn info_text(dict: &Dictionary, key: &[u8]) -> String {
        match dict.get(key).unwrap() {
            Object::String(bytes, _) => decode_text_string(bytes),
            other => panic!("unexpected info value {other:?}"),
        }
    }

    #[test]
    fn packet_carries_pdfa_identification() {
        let metadata = MergeMetadata::new("Merged PDF", "AC Lyon", "Subject", stamp());
        let xmp = metadata.to_xmp_packet().unwrap();
        let xml = xmp.as_str();

        assert!(xml.starts_with("<?xpacket begin=\"\u{feff}\""));
        assert!(xml.ends_with("<?xpacket end=\"w\"?>"));
        assert_eq!(between(xml, "<pdfaid:part>", "</pdfaid:part>"), "1");
        assert_eq!(
            between(xml, "<pdfaid:conformance>", "</pdfaid:conformance>"),
            "B"
        );
    }

    #[test]
    fn dates_and_creator_tool_are_stamped() {
        let metadata = MergeMetadata::new("T", "AC Lyon", "S", stamp());
        let xml = metadata.to_xmp_packet().unwrap().as_str().to_string();

        let expected = "2026-03-14T09:26:53Z";
        assert_eq!(between(&xml, "<xmp:CreateDate>", "</xmp:CreateDate>"), expected);
        assert_eq!(between(&xml, "<xmp:ModifyDate>", "</xmp:ModifyDate>"), expected);
        assert_eq!(between(&xml, "<xmp:MetadataDate>", "</xmp:MetadataDate>"), expected);
        assert_eq!(between(&xml, "<xmp:CreatorTool>", "</xmp:CreatorTool>"), "AC Lyon");
    }

    #[test]
    fn classic_and_xmp_fields_agree() {
        let cases = [
            ("Merged PDF", "AC Lyon", "Subject"),
            ("Relevé de notes", "Académie", "Année 2026"),
            ("A & B <draft>", "\"quoted\"", "it's"),
        ];
        for (title, creator, subject) in cases {
            let metadata = MergeMetadata::new(title, creator, subject, stamp());
            let (info, xmp) = MetadataBuilder::build(&metadata).unwrap();
            let dict = info.to_dictionary();
            let xml = xmp.as_str();

            assert_eq!(info_text(&dict, b"Title"), title);
            assert_eq!(info_text(&dict, b"Creator"), creator);
            assert_eq!(info_text(&dict, b"Subject"), subject);
            assert_eq!(unescape(&dc_alt(xml, "title")).unwrap(), title);
            assert_eq!(unescape(&dc_alt(xml, "description")).unwrap(), subject);
            let seq = between(xml, "<rdf:Seq><rdf:li>", "</rdf:li></rdf:Seq>");
            assert_eq!(unescape(seq).unwrap(), creator);
        }
    }

    /// Text of every element named `name`, unescaped, in document order.
    fn element_texts(xml: &str, name: &[u8]) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut inside = false;
        let mut texts = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => inside = e.name().as_ref() == name,
                Event::Text(t) if inside => texts.push(t.unescape().unwrap().into_owned()),
                Event::End(_) => inside = false,
                Event::Eof => break,
                _ => {}
            }
        }
        texts
    }

    #[test]
    fn packet_is_well_formed_xml() {
        let metadata = MergeMetadata::new("A & B <draft>", "\"O'Brien\"", "x > y", stamp());
        let xmp = metadata.to_xmp_packet().unwrap();

        let items = element_texts(xmp.as_str(), b"rdf:li");
        assert_eq!(items, ["A & B <draft>", "\"O'Brien\"", "x > y"]);
        assert_eq!(element_texts(xmp.as_str(), b"xmp:CreatorTool"), ["\"O'Brien\""]);
        assert_eq!(element_texts(xmp.as_str(), b"pdfaid:part"), ["1"]);
    }

    #[test]
    fn classic_info_has_no_dates() {
        let metadata = MergeMetadata::new("T", "C", "S", stamp());
        let dict = metadata.to_classic_info().unwrap().to_dictionary();
        assert!(!dict.has(b"CreationDate"));
        assert!(!dict.has(b"ModDate"));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn control_characters_are_rejected() {
        let metadata = MergeMetadata::new("bad\u{0}title", "C", "S", stamp());
        let err = MetadataBuilder::build(&metadata).unwrap_err();
        match err {
            MetadataError::InvalidField { field, .. } => assert_eq!(field, "title"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(metadata.to_classic_info().is_err());
    }

    #[test]
    fn whitespace_controls_are_allowed() {
        let metadata = MergeMetadata::new("line\none", "C", "tab\there", stamp());
        assert!(MetadataBuilder::build(&metadata).is_ok());
    }

    #[test]
    fn non_ascii_info_uses_utf16() {
        match text_string("é") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0xE9]);
            }
            other => panic!("unexpected encoding {other:?}"),
        }
        match text_string("plain") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(bytes, b"plain"),
            other => panic!("unexpected encoding {other:?}"),
        }
    }

    #[test]
    fn metadata_stream_is_not_compressed() {
        let metadata = MergeMetadata::from_config(&MergeConfig::default(), stamp());
        let stream = metadata.to_xmp_packet().unwrap().to_stream();
        assert!(!stream.allows_compression);
        assert_eq!(stream.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"XML");
    }
}
