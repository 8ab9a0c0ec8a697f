//! GPX 1.1 export.
//!
//! Emits one `<wpt>` per point. Waze-style multi-stop routes become a
//! waypoint sequence rather than a `<trk>`; consuming apps treat shared
//! stops as discrete markers, not a recorded track.

use std::io::Write;
use std::string::FromUtf8Error;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::position::Position;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
const GPX_CREATOR: &str = "geolink";

/// An error serializing a position to GPX.
#[derive(Debug, Error)]
pub enum GpxError {
    #[error("I/O error writing GPX")]
    Io(#[from] std::io::Error),
    #[error("XML processing error")]
    Xml(#[from] quick_xml::Error),
    #[error("GPX output was not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

/// Write `position` as a GPX 1.1 document.
///
/// Attribute values and text content are XML-escaped by the writer, so
/// queries like `Fish & Chips <to go>` stay well-formed.
///
/// # Errors
///
/// Returns [`GpxError::Io`] if the underlying writer fails.
pub fn write_gpx<W: Write>(position: &Position, out: W) -> Result<(), GpxError> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", GPX_CREATOR));
    gpx.push_attribute(("xmlns", GPX_NAMESPACE));
    writer.write_event(Event::Start(gpx))?;

    let name = position.q.as_deref().filter(|q| !q.is_empty());
    for point in position.all_points() {
        let mut wpt = BytesStart::new("wpt");
        wpt.push_attribute(("lat", point.lat.as_str()));
        wpt.push_attribute(("lon", point.lon.as_str()));
        if let Some(name) = name {
            writer.write_event(Event::Start(wpt))?;
            writer.write_event(Event::Start(BytesStart::new("name")))?;
            writer.write_event(Event::Text(BytesText::new(name)))?;
            writer.write_event(Event::End(BytesEnd::new("name")))?;
            writer.write_event(Event::End(BytesEnd::new("wpt")))?;
        } else {
            writer.write_event(Event::Empty(wpt))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    Ok(())
}

/// Serialize `position` to a GPX 1.1 string.
///
/// # Errors
///
/// Returns [`GpxError`] if serialization fails.
pub fn to_gpx_string(position: &Position) -> Result<String, GpxError> {
    let mut buf = Vec::new();
    write_gpx(position, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
