// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plain text rendering of session snapshots.

use lifetrail_geo::{TrajectoryStats, VisitType};
use lifetrail_playback::{CameraCommand, Frame, LocationDetail, SegmentKind};
use std::fmt::Write;

fn camera_line(command: &CameraCommand) -> String {
    match command {
        CameraCommand::FitBounds { bounds, duration_ms, .. } => {
            let center = bounds.center();
            format!(
                "fit {:.2}x{:.2} deg around ({:.2}, {:.2}) over {duration_ms} ms",
                bounds.width(),
                bounds.height(),
                center.lng,
                center.lat
            )
        }
        CameraCommand::PanTo { center, min_zoom, duration_ms, .. } => format!(
            "pan to ({:.2}, {:.2}) zoom >= {min_zoom} over {duration_ms} ms",
            center.lng, center.lat
        ),
    }
}

/// One-line summary followed by an indented status line
pub fn frame_summary(frame: &Frame) -> String {
    let mut out = String::new();
    let progress = frame.progress;
    let _ = write!(
        out,
        "[{:>3}/{} {:>5.1}%]",
        progress.position, progress.total, progress.percent
    );
    match &frame.event {
        Some(card) => {
            let _ = write!(out, " {} {} @ {}", card.date, card.text, card.location);
            if let Some(age) = &card.age {
                let _ = write!(out, " (age {age})");
            }
            let _ = write!(out, " [{}]", card.movement);
        }
        None => out.push_str(" nothing loaded"),
    }

    let latest = frame
        .segments
        .iter()
        .find(|segment| segment.is_latest)
        .map(|segment| match segment.kind {
            SegmentKind::EventInternal => format!("internal #{}", segment.event_index),
            SegmentKind::Connection => format!("connection #{}", segment.event_index),
        })
        .unwrap_or_else(|| "none".to_string());
    let _ = write!(
        out,
        "\n    t={} ms {:?} segments={} latest={} markers={}",
        frame.now_ms,
        frame.sequence_phase,
        frame.segments.len(),
        latest,
        frame.markers.len()
    );
    if let Some(camera) = &frame.camera {
        let _ = write!(out, "\n    camera: {}", camera_line(camera));
    }
    if let Some(highlight) = &frame.highlight {
        let _ = write!(out, "\n    highlight: event #{}", highlight.event_index);
    }
    out
}

/// Marker table for the frame
pub fn markers(frame: &Frame) -> String {
    let mut out = String::new();
    for marker in &frame.markers {
        let flag = if marker.is_current { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{flag} {:<24} {:<12} {:>3} ({:.2}, {:.2})",
            marker.name,
            marker.css_class,
            marker.count_label,
            marker.coordinates.lng,
            marker.coordinates.lat
        );
    }
    out
}

/// Whole-trajectory statistics
pub fn statistics(stats: &TrajectoryStats) -> String {
    format!(
        "Events:          {}\n\
         Movements:       {}\n\
         International:   {}\n\
         Places visited:  {}\n\
         Time span:       {} years\n",
        stats.total_events,
        stats.movement_count,
        stats.international_count,
        stats.visited_places,
        stats.time_span_years
    )
}

fn visit_label(visit_type: VisitType) -> &'static str {
    match visit_type {
        VisitType::Birth => "birth",
        VisitType::Start => "depart",
        VisitType::Destination => "arrive",
        VisitType::Transit => "via",
        VisitType::Activity => "stay",
    }
}

/// Detail panel for one location
pub fn location_detail(detail: &LocationDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({:.2}, {:.2})",
        detail.name, detail.coordinates.lng, detail.coordinates.lat
    );
    let summary = detail.summary;
    let _ = writeln!(
        out,
        "{} visits: {} arrivals, {} departures, {} transits",
        summary.total, summary.arrivals, summary.departures, summary.transits
    );
    for row in &detail.rows {
        let flag = if row.is_current { '*' } else { ' ' };
        let ordinal = row.ordinal.map(|n| format!("#{n}")).unwrap_or_default();
        let _ = writeln!(
            out,
            "{flag} {:>4} {:<6} {:<4} {} {}",
            row.event_index,
            visit_label(row.visit_type),
            ordinal,
            row.date,
            row.text
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrail_geo::{BoundingBox, LngLat};
    use lifetrail_playback::Easing;

    #[test]
    fn test_camera_line() {
        let pan = CameraCommand::PanTo {
            center: LngLat::new(116.4, 39.9),
            min_zoom: 6,
            duration_ms: 300,
            easing: Easing::EaseInOut,
        };
        assert_eq!(camera_line(&pan), "pan to (116.40, 39.90) zoom >= 6 over 300 ms");

        let mut bounds = BoundingBox::from_point(LngLat::new(110.0, 30.0));
        bounds.extend(LngLat::new(112.0, 31.0));
        let fit = CameraCommand::FitBounds { bounds, duration_ms: 1200, easing: Easing::Linear };
        assert!(camera_line(&fit).starts_with("fit 2.00x1.00 deg around (111.00, 30.50)"));
    }

    #[test]
    fn test_statistics() {
        let stats = TrajectoryStats {
            total_events: 12,
            movement_count: 9,
            visited_places: 7,
            international_count: 1,
            time_span_years: 33,
        };
        let text = statistics(&stats);
        assert!(text.contains("Events:          12"));
        assert!(text.contains("33 years"));
    }
}
