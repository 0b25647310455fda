//! Partial updates driven by sparse change sets.
//!
//! Only fields present in a change set are touched. Numeric, date and point
//! fields are parsed leniently: a value that fails to parse is logged and
//! dropped, leaving the previous value in place.

use chrono::{DateTime, Utc};
use gadder_types::api::{EventChanges, MessageChanges, ParticipantChanges, UserChanges};
use gadder_types::models::{Event, GeoPoint, Message, Participant, User};
use tracing::warn;

/// `Mon Jan 2 2006 15:04:05 MST-07:00` once the zone abbreviation is removed.
pub const DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S %:z";

pub trait PartialUpdate {
    type Changes;

    /// Applies the present fields and reports whether any was applied.
    fn apply_changes(&mut self, changes: &Self::Changes) -> bool;

    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Returns the updated entity and whether anything changed. `updated_at`
/// only moves when something did.
pub fn apply_partial_update<E: PartialUpdate>(mut existing: E, changes: &E::Changes) -> (E, bool) {
    let changed = existing.apply_changes(changes);
    if changed {
        existing.set_updated_at(Utc::now());
    }
    (existing, changed)
}

impl PartialUpdate for User {
    type Changes = UserChanges;

    fn apply_changes(&mut self, changes: &UserChanges) -> bool {
        let mut changed = assign(&mut self.first_name, &changes.first_name);
        changed |= assign(&mut self.last_name, &changes.last_name);
        changed |= assign(&mut self.email, &changes.email);
        changed |= assign(&mut self.avatar, &changes.avatar);
        changed |= assign(&mut self.bio, &changes.bio);
        changed
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl PartialUpdate for Event {
    type Changes = EventChanges;

    fn apply_changes(&mut self, changes: &EventChanges) -> bool {
        let mut changed = assign(&mut self.title, &changes.title);
        changed |= assign(&mut self.description, &changes.description);
        changed |= assign(&mut self.picture_url, &changes.picture_url);

        if let Some(raw) = &changes.privacy_level {
            if let Some(level) = parse_int("privacy_level", raw) {
                self.privacy_level = level;
                changed = true;
            }
        }
        if let Some(raw) = &changes.start_date {
            if let Some(date) = parse_date("start_date", raw) {
                self.start_date = date;
                changed = true;
            }
        }
        if let Some(raw) = &changes.end_date {
            if let Some(date) = parse_date("end_date", raw) {
                self.end_date = date;
                changed = true;
            }
        }

        // A point needs both halves; a lone lon or lat is ignored.
        if let (Some(lon), Some(lat)) = (&changes.lon, &changes.lat) {
            if let Some(point) = parse_point(lon, lat) {
                self.location = point;
                changed = true;
            }
        }

        changed
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl PartialUpdate for Message {
    type Changes = MessageChanges;

    fn apply_changes(&mut self, changes: &MessageChanges) -> bool {
        let mut changed = assign(&mut self.content, &changes.content);
        changed |= assign(&mut self.references, &changes.references);
        changed
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl PartialUpdate for Participant {
    type Changes = ParticipantChanges;

    fn apply_changes(&mut self, changes: &ParticipantChanges) -> bool {
        let mut changed = assign(&mut self.request_status, &changes.request_status);
        changed |= assign(&mut self.response_status, &changes.response_status);
        changed
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

fn assign(field: &mut String, value: &Option<String>) -> bool {
    match value {
        Some(v) => {
            field.clone_from(v);
            true
        }
        None => false,
    }
}

fn parse_int(field: &str, raw: &str) -> Option<i64> {
    raw.parse()
        .map_err(|e| warn!("Ignoring {} {:?}: {}", field, raw, e))
        .ok()
}

fn parse_point(lon: &str, lat: &str) -> Option<GeoPoint> {
    match (lon.parse::<f64>(), lat.parse::<f64>()) {
        (Ok(lon), Ok(lat)) => Some(GeoPoint { lon, lat }),
        _ => {
            warn!("Ignoring location lon={:?} lat={:?}", lon, lat);
            None
        }
    }
}

fn parse_date(field: &str, raw: &str) -> Option<DateTime<Utc>> {
    let parsed = parse_event_date(raw);
    if parsed.is_none() {
        warn!("Ignoring {} {:?}: expected e.g. \"Mon Jan 2 2006 15:04:05 MST-07:00\"", field, raw);
    }
    parsed
}

/// Parses `Tue Mar 31 2015 23:15:17 EDT-04:00`. The zone abbreviation is
/// informational; the numeric offset glued to it decides the instant.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let (head, zone) = raw.trim().rsplit_once(' ')?;
    let offset = &zone[zone.find(['+', '-'])?..];
    let normalized = format!("{} {}", head, offset);

    DateTime::parse_from_str(&normalized, DATE_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> Event {
        let created = Utc.with_ymd_and_hms(2015, 4, 1, 2, 55, 21).unwrap();
        Event {
            title: "SXSW".into(),
            description: "Conference".into(),
            privacy_level: 2,
            created_at: created,
            updated_at: created,
            ..Event::default()
        }
    }

    #[test]
    fn absent_fields_are_untouched_and_unchanged() {
        let before = event();
        let (after, changed) = apply_partial_update(before.clone(), &EventChanges::default());

        assert!(!changed);
        assert_eq!(after, before);
    }

    #[test]
    fn present_fields_apply_and_advance_updated_at() {
        let before = event();
        let changes = EventChanges {
            title: Some("Railsconf".into()),
            privacy_level: Some("1".into()),
            ..EventChanges::default()
        };

        let (after, changed) = apply_partial_update(before.clone(), &changes);

        assert!(changed);
        assert_eq!(after.title, "Railsconf");
        assert_eq!(after.privacy_level, 1);
        assert_eq!(after.description, "Conference");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn malformed_numbers_and_dates_keep_prior_values() {
        let before = event();
        let changes = EventChanges {
            privacy_level: Some("high".into()),
            start_date: Some("next tuesday".into()),
            ..EventChanges::default()
        };

        let (after, changed) = apply_partial_update(before.clone(), &changes);

        assert!(!changed);
        assert_eq!(after, before);
    }

    #[test]
    fn point_requires_both_coordinates() {
        let lone = EventChanges {
            lon: Some("-75.1641667".into()),
            ..EventChanges::default()
        };
        let (after, changed) = apply_partial_update(event(), &lone);
        assert!(!changed);
        assert_eq!(after.location, GeoPoint::default());

        let both = EventChanges {
            lon: Some("-75.1641667".into()),
            lat: Some("39.9522222".into()),
            ..EventChanges::default()
        };
        let (after, changed) = apply_partial_update(event(), &both);
        assert!(changed);
        assert_eq!(
            after.location,
            GeoPoint {
                lon: -75.1641667,
                lat: 39.9522222
            }
        );
    }

    #[test]
    fn dates_parse_with_zone_offset() {
        let changes = EventChanges {
            start_date: Some("Tue Mar 31 2015 23:15:17 EDT-04:00".into()),
            end_date: Some("Sun Jan 4 2015 09:00:00 CET+01:00".into()),
            ..EventChanges::default()
        };

        let (after, changed) = apply_partial_update(event(), &changes);

        assert!(changed);
        assert_eq!(
            after.start_date,
            Utc.with_ymd_and_hms(2015, 4, 1, 3, 15, 17).unwrap()
        );
        assert_eq!(
            after.end_date,
            Utc.with_ymd_and_hms(2015, 1, 4, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn date_without_offset_is_rejected() {
        assert!(parse_event_date("Tue Mar 31 2015 23:15:17 EDT").is_none());
        assert!(parse_event_date("2015-03-31T23:15:17Z").is_none());
        assert!(parse_event_date("").is_none());
    }

    #[test]
    fn repeated_identical_update_is_stable_but_still_changed() {
        let past = Utc.with_ymd_and_hms(2015, 4, 1, 3, 11, 12).unwrap();
        let original = Participant {
            request_status: "requested".into(),
            response_status: "pending".into(),
            created_at: past,
            updated_at: past,
            ..Participant::default()
        };
        let changes = ParticipantChanges {
            response_status: Some("accepted".into()),
            ..ParticipantChanges::default()
        };

        let (first, changed_first) = apply_partial_update(original.clone(), &changes);
        let mut stale = first.clone();
        stale.updated_at = past;
        let (second, changed_second) = apply_partial_update(stale, &changes);

        assert!(changed_first);
        assert!(changed_second);
        assert!(first.updated_at > past);
        assert!(second.updated_at > past);
        assert_eq!(first.response_status, "accepted");

        // Everything but updated_at is identical across both applications.
        let mut first_visible = first.clone();
        let mut second_visible = second.clone();
        first_visible.updated_at = past;
        second_visible.updated_at = past;
        assert_eq!(first_visible, second_visible);
        assert_eq!(second.created_at, original.created_at);
    }

    #[test]
    fn user_and_message_fields_apply_independently() {
        let (user, changed) = apply_partial_update(
            User {
                bio: "blah".into(),
                ..User::default()
            },
            &UserChanges {
                first_name: Some("Joe".into()),
                ..UserChanges::default()
            },
        );
        assert!(changed);
        assert_eq!(user.first_name, "Joe");
        assert_eq!(user.bio, "blah");

        let (message, changed) = apply_partial_update(
            Message {
                content: "hi".into(),
                ..Message::default()
            },
            &MessageChanges {
                references: Some("#2".into()),
                ..MessageChanges::default()
            },
        );
        assert!(changed);
        assert_eq!(message.content, "hi");
        assert_eq!(message.references, "#2");
    }
}
