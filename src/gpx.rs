use crate::dlog;
use crate::types::{Coordinates, Workout};
use anyhow::{Context, Result};
use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::fs;
use std::io::{BufReader, Cursor, Write};
use std::path::Path;

/// First waypoint, track point or route point with a usable position.
pub fn first_point(path: &Path) -> Result<Option<Coordinates>> {
    let bytes = fs::read(path).with_context(|| format!("reading GPX: {}", path.display()))?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let mut xml = Reader::from_reader(BufReader::new(Cursor::new(bytes)));
    xml.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Eof) => return Ok(None),
            Ok(Event::Start(e) | Event::Empty(e)) => {
                if is_point(&e)
                    && let Some(c) = parse_lat_lon(&e)
                {
                    dlog!("gpx first point {c} in {}", path.display());
                    return Ok(Some(c));
                }
            }
            Err(e) => anyhow::bail!("GPX XML parse error: {e}"),
            _ => {}
        }
        buf.clear();
    }
}

fn is_point(e: &BytesStart<'_>) -> bool {
    matches!(e.name().as_ref(), b"wpt" | b"trkpt" | b"rtept")
}

fn parse_lat_lon(e: &BytesStart<'_>) -> Option<Coordinates> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for a in e.attributes().with_checks(false).flatten() {
        let key = a.key.as_ref();
        if key == b"lat"
            && let Ok(v) = a.unescape_value()
        {
            lat = v.trim().parse::<f64>().ok();
        } else if key == b"lon"
            && let Ok(v) = a.unescape_value()
        {
            lon = v.trim().parse::<f64>().ok();
        }
    }

    let c = Coordinates::new(lat?, lon?);
    c.validate().ok().map(|()| c)
}

/// Writes a GPX 1.1 document with one waypoint per workout.
pub fn write_waypoints<W: Write>(workouts: &[Workout], out: W) -> Result<()> {
    let mut w = Writer::new_with_indent(out, b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("gpx");
    root.push_attribute(("version", "1.1"));
    root.push_attribute(("creator", "mapty"));
    root.push_attribute(("xmlns", "http://www.topografix.com/GPX/1/1"));
    w.write_event(Event::Start(root))?;

    for workout in workouts {
        let c = workout.coordinates();
        let lat = c.lat.to_string();
        let lon = c.lng.to_string();
        let mut wpt = BytesStart::new("wpt");
        wpt.push_attribute(("lat", lat.as_str()));
        wpt.push_attribute(("lon", lon.as_str()));
        w.write_event(Event::Start(wpt))?;

        let time = workout
            .created_at()
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        write_text_element(&mut w, "time", &time)?;
        write_text_element(&mut w, "name", &workout.description())?;
        write_text_element(&mut w, "desc", workout.id().as_str())?;
        write_text_element(&mut w, "type", workout.kind().as_str())?;

        w.write_event(Event::End(BytesEnd::new("wpt")))?;
    }

    w.write_event(Event::End(BytesEnd::new("gpx")))?;
    dlog!("gpx waypoints written count={}", workouts.len());
    Ok(())
}

fn write_text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn export_waypoints(workouts: &[Workout], path: &Path) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_waypoints(workouts, std::io::BufWriter::new(file))
        .with_context(|| format!("writing GPX: {}", path.display()))?;
    tracing::info!(path = %path.display(), waypoints = workouts.len(), "exported markers");
    Ok(())
}
