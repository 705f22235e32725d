// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridHarvest.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Streaming XML codec for ENTSO-E market documents.
//!
//! Parsing matches elements by local name, so `ns0:`-prefixed and
//! default-namespace documents read the same. The writer emits the root
//! element under the default namespace recorded at parse time, which keeps
//! the output re-parseable by namespace-aware consumers.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt::Display;

use crate::errors::DocumentError;
use gridharvest_types::{
    DocumentHeader, MarketDocument, Period, Point, Resolution, TimeInterval, TimeSeries,
};

/// Header tags reproduced on output, in wire order.
const HEADER_ORDER: [&str; 8] = [
    "mRID",
    "revisionNumber",
    "type",
    "process.processType",
    "sender_MarketParticipant.mRID",
    "sender_MarketParticipant.marketRole.type",
    "receiver_MarketParticipant.mRID",
    "receiver_MarketParticipant.marketRole.type",
];

#[derive(Debug, Default)]
struct RawPoint {
    position: Option<String>,
    quantity: Option<String>,
}

impl RawPoint {
    fn finish(self) -> Point {
        Point {
            position: self.position.and_then(|raw| raw.trim().parse().ok()),
            quantity: self.quantity.and_then(|raw| raw.trim().parse().ok()),
        }
    }
}

/// Parse a market document, validating point values exactly once.
///
/// The only fatal condition is malformed XML at the document root; missing
/// or unparseable leaf values become `None` in the typed model and are dealt
/// with by the stage that cares about them.
pub fn parse_document(input: &str) -> Result<MarketDocument, DocumentError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut doc = MarketDocument::default();
    let mut path: Vec<String> = Vec::new();
    let mut series: Option<TimeSeries> = None;
    let mut period: Option<Period> = None;
    let mut point: Option<RawPoint> = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(DocumentError::Parse(e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) => {
                let name = local_name(&start);
                if path.is_empty() {
                    doc.root_tag = name.clone();
                    doc.namespace = default_namespace(&start);
                }
                match name.as_str() {
                    "TimeSeries" => series = Some(TimeSeries::default()),
                    "Period" if series.is_some() => period = Some(Period::default()),
                    "Point" if period.is_some() => point = Some(RawPoint::default()),
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| DocumentError::Parse(e.to_string()))?
                    .into_owned();
                assign_text(
                    &path,
                    value,
                    &mut doc.header,
                    &mut series,
                    &mut period,
                    &mut point,
                );
            }
            Ok(Event::End(_)) => {
                let Some(closed) = path.pop() else {
                    return Err(DocumentError::Parse("unbalanced end tag".to_owned()));
                };
                match closed.as_str() {
                    "Point" => {
                        if let (Some(raw), Some(p)) = (point.take(), period.as_mut()) {
                            p.points.push(raw.finish());
                        }
                    }
                    "Period" => {
                        if let (Some(p), Some(s)) = (period.take(), series.as_mut()) {
                            s.periods.push(p);
                        }
                    }
                    "TimeSeries" => {
                        if let Some(s) = series.take() {
                            doc.series.push(s);
                        }
                    }
                    _ => {}
                }
            }
            // Declarations, comments, self-closing elements: nothing we keep.
            Ok(_) => {}
        }
    }

    if doc.root_tag.is_empty() {
        return Err(DocumentError::Parse("no root element found".to_owned()));
    }
    if !path.is_empty() {
        return Err(DocumentError::Parse(format!(
            "unexpected end of document inside <{}>",
            path.join("/")
        )));
    }
    Ok(doc)
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn default_namespace(start: &BytesStart<'_>) -> String {
    let mut fallback = String::new();
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_default();
        if key == "xmlns" {
            return value;
        }
        if key.starts_with("xmlns:") && fallback.is_empty() {
            fallback = value;
        }
    }
    fallback
}

fn assign_text(
    path: &[String],
    value: String,
    header: &mut DocumentHeader,
    series: &mut Option<TimeSeries>,
    period: &mut Option<Period>,
    point: &mut Option<RawPoint>,
) {
    let Some(leaf) = path.last() else { return };
    let parent = path.len().checked_sub(2).map(|i| path[i].as_str());

    if let Some(raw) = point.as_mut() {
        match leaf.as_str() {
            "position" => raw.position = Some(value),
            "quantity" => raw.quantity = Some(value),
            _ => {}
        }
        return;
    }

    if let Some(p) = period.as_mut() {
        match (leaf.as_str(), parent) {
            ("resolution", _) => p.resolution = Resolution::from_code(value.trim()),
            ("start", Some("timeInterval")) => p.interval.start = value,
            ("end", Some("timeInterval")) => p.interval.end = value,
            _ => {}
        }
        return;
    }

    if let Some(s) = series.as_mut() {
        match (leaf.as_str(), parent) {
            ("mRID", Some("TimeSeries")) => s.mrid = Some(value),
            ("businessType", _) => s.business_type = Some(value),
            ("in_Domain.mRID", _) => s.in_domain = Some(value),
            ("out_Domain.mRID", _) => s.out_domain = Some(value),
            ("psrType", Some("MktPSRType")) => s.psr_type = Some(value),
            ("name", Some("PowerSystemResources")) => s.psr_name = Some(value),
            ("quantity_Measure_Unit.name", _) => s.measure_unit = Some(value),
            ("curveType", _) => s.curve_type = Some(value),
            _ => {}
        }
        return;
    }

    // Document header, direct children of the root.
    match (leaf.as_str(), parent, path.len()) {
        ("mRID", _, 2) => header.mrid = Some(value),
        ("revisionNumber", _, 2) => header.revision_number = Some(value),
        ("type", _, 2) => header.doc_type = Some(value),
        ("process.processType", _, 2) => header.process_type = Some(value),
        ("sender_MarketParticipant.mRID", _, 2) => header.sender_mrid = Some(value),
        ("sender_MarketParticipant.marketRole.type", _, 2) => header.sender_role = Some(value),
        ("receiver_MarketParticipant.mRID", _, 2) => header.receiver_mrid = Some(value),
        ("receiver_MarketParticipant.marketRole.type", _, 2) => header.receiver_role = Some(value),
        ("createdDateTime", _, 2) => header.created = Some(value),
        ("start", Some("time_Period.timeInterval"), 3) => {
            header.interval.get_or_insert_with(TimeInterval::default).start = value;
        }
        ("end", Some("time_Period.timeInterval"), 3) => {
            header.interval.get_or_insert_with(TimeInterval::default).end = value;
        }
        _ => {}
    }
}

/// Serialize a document back to namespaced XML with a declaration.
pub fn write_document(doc: &MarketDocument) -> Result<String, DocumentError> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;

    let mut root = BytesStart::new(doc.root_tag.as_str());
    if !doc.namespace.is_empty() {
        root.push_attribute(("xmlns", doc.namespace.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(write_err)?;

    write_header(&mut writer, &doc.header)?;
    for series in &doc.series {
        write_series(&mut writer, series)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(doc.root_tag.as_str())))
        .map_err(write_err)?;

    String::from_utf8(writer.into_inner()).map_err(|e| DocumentError::Write(e.to_string()))
}

fn write_header<W: std::io::Write>(
    writer: &mut Writer<W>,
    header: &DocumentHeader,
) -> Result<(), DocumentError> {
    let values = [
        &header.mrid,
        &header.revision_number,
        &header.doc_type,
        &header.process_type,
        &header.sender_mrid,
        &header.sender_role,
        &header.receiver_mrid,
        &header.receiver_role,
    ];
    for (tag, value) in HEADER_ORDER.iter().zip(values) {
        if let Some(text) = value {
            text_element(writer, tag, text)?;
        }
    }
    if let Some(created) = &header.created {
        text_element(writer, "createdDateTime", created)?;
    }
    if let Some(interval) = &header.interval {
        open(writer, "time_Period.timeInterval")?;
        text_element(writer, "start", &interval.start)?;
        text_element(writer, "end", &interval.end)?;
        close(writer, "time_Period.timeInterval")?;
    }
    Ok(())
}

fn write_series<W: std::io::Write>(
    writer: &mut Writer<W>,
    series: &TimeSeries,
) -> Result<(), DocumentError> {
    open(writer, "TimeSeries")?;
    if let Some(mrid) = &series.mrid {
        text_element(writer, "mRID", mrid)?;
    }
    if let Some(business_type) = &series.business_type {
        text_element(writer, "businessType", business_type)?;
    }
    if let Some(in_domain) = &series.in_domain {
        text_element(writer, "in_Domain.mRID", in_domain)?;
    }
    if let Some(out_domain) = &series.out_domain {
        text_element(writer, "out_Domain.mRID", out_domain)?;
    }
    if let Some(unit) = &series.measure_unit {
        text_element(writer, "quantity_Measure_Unit.name", unit)?;
    }
    if let Some(curve_type) = &series.curve_type {
        text_element(writer, "curveType", curve_type)?;
    }
    if series.psr_type.is_some() || series.psr_name.is_some() {
        open(writer, "MktPSRType")?;
        if let Some(psr_type) = &series.psr_type {
            text_element(writer, "psrType", psr_type)?;
        }
        if let Some(psr_name) = &series.psr_name {
            open(writer, "PowerSystemResources")?;
            text_element(writer, "name", psr_name)?;
            close(writer, "PowerSystemResources")?;
        }
        close(writer, "MktPSRType")?;
    }
    for period in &series.periods {
        open(writer, "Period")?;
        open(writer, "timeInterval")?;
        text_element(writer, "start", &period.interval.start)?;
        text_element(writer, "end", &period.interval.end)?;
        close(writer, "timeInterval")?;
        text_element(writer, "resolution", period.resolution.code())?;
        for p in &period.points {
            open(writer, "Point")?;
            if let Some(position) = p.position {
                text_element(writer, "position", &position.to_string())?;
            }
            if let Some(quantity) = p.quantity {
                text_element(writer, "quantity", &format_quantity(quantity))?;
            }
            close(writer, "Point")?;
        }
        close(writer, "Period")?;
    }
    close(writer, "TimeSeries")?;
    Ok(())
}

fn open<W: std::io::Write>(writer: &mut Writer<W>, tag: &str) -> Result<(), DocumentError> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(write_err)
}

fn close<W: std::io::Write>(writer: &mut Writer<W>, tag: &str) -> Result<(), DocumentError> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(write_err)
}

fn text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), DocumentError> {
    open(writer, tag)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_err)?;
    close(writer, tag)
}

fn write_err<E: Display>(e: E) -> DocumentError {
    DocumentError::Write(e.to_string())
}

/// Quantities on the wire are plain decimals; keep integral values free of
/// a trailing ".0" the way the upstream API formats them.
fn format_quantity(quantity: f64) -> String {
    if quantity.is_finite() && quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{quantity:.0}")
    } else {
        quantity.to_string()
    }
}
