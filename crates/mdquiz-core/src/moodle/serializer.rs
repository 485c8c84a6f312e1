//! XML text output for the element tree.

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::tree::XmlNode;
use crate::error::SerializeError;

/// Serialize `root` as a UTF-8 XML document with two-space indentation.
///
/// Text is escaped for `<`, `>` and `&` only; quotes are left as written.
/// Elements without text and children are written as empty elements.
pub fn serialize(root: &XmlNode) -> Result<String, SerializeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_node(&mut writer, root)?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), SerializeError> {
    let mut start = BytesStart::new(node.tag.as_str());
    for (name, value) in &node.attrs {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if node.text.is_empty() && node.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !node.text.is_empty() {
        writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(
            node.text.as_str(),
        ))))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    Ok(())
}
