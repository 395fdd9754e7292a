//! Document model for the notification file.
//! Holds the global flags and the ordered notification list, plus the
//! mutation operations the editor is allowed to perform on them.
//! Flags are booleans in memory but stored as 0/1 integers on disk.
//! Keys this model does not know about are kept and written back untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{EditorError, Result};

pub const DEFAULT_VERSION: i64 = 1;

/// Root of the notification document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "m_Version", default = "default_version")]
    pub version: i64,
    #[serde(rename = "Enabled", default, with = "int_flag")]
    pub enabled: bool,
    #[serde(rename = "UTC", default, with = "int_flag")]
    pub use_utc: bool,
    #[serde(rename = "UseMissionTime", default, with = "int_flag")]
    pub use_mission_time: bool,
    #[serde(rename = "Notifications", default)]
    pub notifications: Vec<Notification>,
    /// Top-level keys not modelled above, in file order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            enabled: false,
            use_utc: false,
            use_mission_time: false,
            notifications: Vec::new(),
            extra: Map::new(),
        }
    }
}

fn default_version() -> i64 {
    DEFAULT_VERSION
}

/// One scheduled notification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "Hour", default)]
    pub hour: u32,
    #[serde(rename = "Minute", default)]
    pub minute: u32,
    #[serde(rename = "Second", default)]
    pub second: u32,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "Icon", default)]
    pub icon: String,
    #[serde(rename = "Color", default)]
    pub color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notification {
    /// Snapshot of the editable fields.
    pub fn fields(&self) -> NotificationFields {
        NotificationFields {
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            title: self.title.clone(),
            text: self.text.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
        }
    }
}

/// The values a single edit writes into a notification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationFields {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub title: String,
    pub text: String,
    pub icon: String,
    pub color: String,
}

impl NotificationFields {
    pub fn validate(&self) -> Result<()> {
        TimeField::Hour.check(self.hour)?;
        TimeField::Minute.check(self.minute)?;
        TimeField::Second.check(self.second)?;
        Ok(())
    }
}

/// The bounded time-of-day components of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeField {
    Hour,
    Minute,
    Second,
}

impl TimeField {
    pub const ALL: [TimeField; 3] = [TimeField::Hour, TimeField::Minute, TimeField::Second];

    /// Largest accepted value, inclusive.
    pub fn max(self) -> u32 {
        match self {
            TimeField::Hour => 23,
            TimeField::Minute | TimeField::Second => 59,
        }
    }

    pub fn get(self, fields: &NotificationFields) -> u32 {
        match self {
            TimeField::Hour => fields.hour,
            TimeField::Minute => fields.minute,
            TimeField::Second => fields.second,
        }
    }

    pub fn set(self, fields: &mut NotificationFields, value: u32) {
        match self {
            TimeField::Hour => fields.hour = value,
            TimeField::Minute => fields.minute = value,
            TimeField::Second => fields.second = value,
        }
    }

    pub fn check(self, value: u32) -> Result<()> {
        if value > self.max() {
            return Err(EditorError::Validation {
                field: self,
                value,
                max: self.max(),
            });
        }
        Ok(())
    }

    /// Parses the full contents of an input field.
    /// Only a non-empty run of ASCII digits within range is accepted, so
    /// signs, spaces and the empty string are all refused.
    pub fn parse_input(self, input: &str) -> Option<u32> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Overlong digit runs overflow u32 and are out of range anyway.
        let value: u32 = input.parse().ok()?;
        self.check(value).ok()?;
        Some(value)
    }

    /// Keystroke filter: whether `input` may become the field's new contents.
    pub fn accepts_input(self, input: &str) -> bool {
        self.parse_input(input).is_some()
    }
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Hour => write!(f, "Hour"),
            TimeField::Minute => write!(f, "Minute"),
            TimeField::Second => write!(f, "Second"),
        }
    }
}

/// The global on/off switches of the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Enabled,
    Utc,
    MissionTime,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Enabled, Flag::Utc, Flag::MissionTime];

    pub fn label(self) -> &'static str {
        match self {
            Flag::Enabled => "Enable Notifications",
            Flag::Utc => "Use UTC",
            Flag::MissionTime => "Use Mission Time",
        }
    }

    pub fn get(self, config: &Configuration) -> bool {
        match self {
            Flag::Enabled => config.enabled,
            Flag::Utc => config.use_utc,
            Flag::MissionTime => config.use_mission_time,
        }
    }

    pub fn set(self, config: &mut Configuration, value: bool) {
        match self {
            Flag::Enabled => config.enabled = value,
            Flag::Utc => config.use_utc = value,
            Flag::MissionTime => config.use_mission_time = value,
        }
    }

    /// Flips the flag and returns its new value.
    pub fn toggle(self, config: &mut Configuration) -> bool {
        let value = !self.get(config);
        self.set(config, value);
        value
    }
}

impl Configuration {
    /// Parses a notification document. Missing keys take their defaults.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let config: Configuration = serde_json::from_slice(bytes)?;
        debug!(
            notifications = config.notifications.len(),
            extra_keys = config.extra.len(),
            "loaded notification document"
        );
        Ok(config)
    }

    /// Encodes the document as 4-space indented JSON.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        Serialize::serialize(self, &mut ser).map_err(EditorError::Encode)?;
        Ok(out)
    }

    /// Appends a default notification and returns its index.
    pub fn add_notification(&mut self) -> usize {
        self.notifications.push(Notification::default());
        let index = self.notifications.len() - 1;
        debug!(index, "added notification");
        index
    }

    /// Removes the notification at `index`, returning it.
    pub fn delete_notification(&mut self, index: usize) -> Result<Notification> {
        self.check_index(index)?;
        let removed = self.notifications.remove(index);
        debug!(index, remaining = self.notifications.len(), "deleted notification");
        Ok(removed)
    }

    /// Overwrites the editable fields of the notification at `index`.
    /// Nothing is written unless every time field is within range.
    pub fn update_notification(&mut self, index: usize, fields: NotificationFields) -> Result<()> {
        self.check_index(index)?;
        fields.validate()?;

        let record = &mut self.notifications[index];
        record.hour = fields.hour;
        record.minute = fields.minute;
        record.second = fields.second;
        record.title = fields.title;
        record.text = fields.text;
        record.icon = fields.icon;
        record.color = fields.color;
        debug!(index, "updated notification");
        Ok(())
    }

    pub fn notification(&self, index: usize) -> Result<&Notification> {
        self.check_index(index)?;
        Ok(&self.notifications[index])
    }

    pub fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.notifications.len();
        if index >= len {
            return Err(EditorError::Index { index, len });
        }
        Ok(())
    }
}

/// Serde adapter storing a bool as 0/1.
/// Reading also tolerates JSON `true`/`false`.
mod int_flag {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("0, 1 or a boolean")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Signed(other), &self)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RAID: &str = r#"{"Notifications":[{"Hour":5,"Minute":30,"Second":0,"Title":"Raid","Text":"Incoming","Icon":"warning","Color":"red"}]}"#;

    fn raid_fields() -> NotificationFields {
        NotificationFields {
            hour: 5,
            minute: 30,
            second: 0,
            title: "Raid".into(),
            text: "Incoming".into(),
            icon: "warning".into(),
            color: "red".into(),
        }
    }

    #[test]
    fn test_load_empty_object_uses_defaults() {
        let config = Configuration::load(b"{}").unwrap();
        assert_eq!(config, Configuration::default());
        assert_eq!(config.version, 1);
        assert!(!config.enabled && !config.use_utc && !config.use_mission_time);
        assert!(config.notifications.is_empty());
    }

    #[test]
    fn test_load_record_missing_fields_uses_defaults() {
        let config = Configuration::load(br#"{"Notifications":[{"Title":"Only title"}]}"#).unwrap();
        let record = &config.notifications[0];
        assert_eq!(record.hour, 0);
        assert_eq!(record.minute, 0);
        assert_eq!(record.text, "");
        assert_eq!(record.title, "Only title");
    }

    #[test]
    fn test_load_malformed_is_parse_error() {
        let err = Configuration::load(b"{\"Notifications\": [").unwrap_err();
        assert!(matches!(err, EditorError::Parse(_)));
    }

    #[test]
    fn test_load_wrong_type_is_parse_error() {
        let err = Configuration::load(br#"{"Notifications": {"Hour": 1}}"#).unwrap_err();
        assert!(matches!(err, EditorError::Parse(_)));
    }

    #[test]
    fn test_flags_read_ints_and_bools() {
        let config = Configuration::load(br#"{"Enabled":1,"UTC":true,"UseMissionTime":0}"#).unwrap();
        assert!(config.enabled);
        assert!(config.use_utc);
        assert!(!config.use_mission_time);
    }

    #[test]
    fn test_flag_out_of_range_is_parse_error() {
        let err = Configuration::load(br#"{"Enabled":2}"#).unwrap_err();
        assert!(matches!(err, EditorError::Parse(_)));
    }

    #[test]
    fn test_flags_written_as_ints() {
        let mut config = Configuration::default();
        config.use_utc = true;
        let value: Value = serde_json::from_slice(&config.serialize().unwrap()).unwrap();
        assert_eq!(value["Enabled"], Value::from(0));
        assert_eq!(value["UTC"], Value::from(1));
        assert_eq!(value["UseMissionTime"], Value::from(0));
        assert_eq!(value["m_Version"], Value::from(1));
    }

    #[test]
    fn test_serialize_uses_four_space_indent() {
        let text = String::from_utf8(Configuration::default().serialize().unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"m_Version\": 1,"));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let source = r##"{
            "m_Version": 3,
            "Enabled": 1,
            "UTC": 0,
            "UseMissionTime": 1,
            "ServerName": "alpha",
            "Notifications": [
                {"Hour": 23, "Minute": 59, "Second": 59, "Title": "A", "Text": "two\nlines",
                 "Icon": "info", "Color": "#FFAA00", "Sound": "bell"}
            ]
        }"##;
        let first = Configuration::load(source.as_bytes()).unwrap().serialize().unwrap();
        let second = Configuration::load(&first).unwrap().serialize().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_keys_survive() {
        let source = br#"{"ServerName":"alpha","Notifications":[{"Hour":1,"Sound":"bell"}],"Nested":{"a":[1,2]}}"#;
        let config = Configuration::load(source).unwrap();
        assert_eq!(config.extra.len(), 2);
        let value: Value = serde_json::from_slice(&config.serialize().unwrap()).unwrap();
        assert_eq!(value["ServerName"], Value::from("alpha"));
        assert_eq!(value["Nested"]["a"][1], Value::from(2));
        assert_eq!(value["Notifications"][0]["Sound"], Value::from("bell"));
        assert_eq!(value["Notifications"][0]["Hour"], Value::from(1));
    }

    #[test]
    fn test_add_appends_default() {
        let mut config = Configuration::load(RAID.as_bytes()).unwrap();
        let index = config.add_notification();
        assert_eq!(index, 1);
        assert_eq!(config.notifications.len(), 2);
        assert_eq!(config.notifications[1], Notification::default());
    }

    #[test]
    fn test_delete_keeps_order_of_others() {
        let mut config = Configuration::default();
        for title in ["a", "b", "c", "d"] {
            let index = config.add_notification();
            config.notifications[index].title = title.into();
        }
        let removed = config.delete_notification(1).unwrap();
        assert_eq!(removed.title, "b");
        let titles: Vec<_> = config.notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["a", "c", "d"]);
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut config = Configuration::default();
        let err = config.delete_notification(0).unwrap_err();
        assert!(matches!(err, EditorError::Index { index: 0, len: 0 }));
    }

    #[test]
    fn test_update_applies_fields() {
        let mut config = Configuration::default();
        config.add_notification();
        config.update_notification(0, raid_fields()).unwrap();
        assert_eq!(config.notifications[0].fields(), raid_fields());
    }

    #[test]
    fn test_update_rejects_out_of_range_and_keeps_record() {
        let mut config = Configuration::load(RAID.as_bytes()).unwrap();
        for field in TimeField::ALL {
            let mut fields = raid_fields();
            field.set(&mut fields, field.max() + 1);
            fields.title = "changed".into();
            let err = config.update_notification(0, fields).unwrap_err();
            assert!(matches!(err, EditorError::Validation { field: f, .. } if f == field));
            assert_eq!(config.notifications[0].fields(), raid_fields());
        }
    }

    #[test]
    fn test_update_accepts_bounds() {
        let mut config = Configuration::load(RAID.as_bytes()).unwrap();
        let mut fields = raid_fields();
        fields.hour = 23;
        fields.minute = 59;
        fields.second = 59;
        config.update_notification(0, fields).unwrap();
        let record = &config.notifications[0];
        assert_eq!((record.hour, record.minute, record.second), (23, 59, 59));
    }

    #[test]
    fn test_update_out_of_range_index() {
        let mut config = Configuration::default();
        let err = config.update_notification(3, raid_fields()).unwrap_err();
        assert!(matches!(err, EditorError::Index { index: 3, len: 0 }));
    }

    #[test]
    fn test_raid_scenario() {
        let mut config = Configuration::load(RAID.as_bytes()).unwrap();
        assert_eq!(config.version, 1);
        assert!(!config.enabled && !config.use_utc && !config.use_mission_time);
        assert_eq!(config.notifications.len(), 1);
        assert_eq!(config.notifications[0].fields(), raid_fields());

        let mut fields = raid_fields();
        fields.minute = 61;
        let err = config.update_notification(0, fields).unwrap_err();
        assert!(matches!(err, EditorError::Validation { field: TimeField::Minute, value: 61, max: 59 }));
        assert_eq!(config.notifications[0].fields(), raid_fields());

        config.add_notification();
        assert_eq!(config.notifications.len(), 2);
        config.delete_notification(0).unwrap();
        assert_eq!(config.notifications, vec![Notification::default()]);

        let value: Value = serde_json::from_slice(&config.serialize().unwrap()).unwrap();
        let expected = serde_json::json!({
            "m_Version": 1,
            "Enabled": 0,
            "UTC": 0,
            "UseMissionTime": 0,
            "Notifications": [
                {"Hour": 0, "Minute": 0, "Second": 0, "Title": "", "Text": "", "Icon": "", "Color": ""}
            ]
        });
        assert_eq!(value, expected);
    }

    #[test]
    fn test_time_input_filter() {
        assert!(TimeField::Hour.accepts_input("0"));
        assert!(TimeField::Hour.accepts_input("23"));
        assert!(TimeField::Hour.accepts_input("007"));
        assert!(!TimeField::Hour.accepts_input("24"));
        assert!(TimeField::Minute.accepts_input("59"));
        assert!(!TimeField::Second.accepts_input("60"));
        assert!(!TimeField::Minute.accepts_input(""));
        assert!(!TimeField::Minute.accepts_input("-1"));
        assert!(!TimeField::Minute.accepts_input("+5"));
        assert!(!TimeField::Minute.accepts_input("5 "));
        assert!(!TimeField::Minute.accepts_input("1a"));
        assert!(!TimeField::Hour.accepts_input("99999999999999999999"));
        assert_eq!(TimeField::Second.parse_input("42"), Some(42));
    }

    #[test]
    fn test_flag_toggle() {
        let mut config = Configuration::default();
        assert!(Flag::MissionTime.toggle(&mut config));
        assert!(config.use_mission_time);
        assert!(!Flag::MissionTime.toggle(&mut config));
        Flag::Utc.set(&mut config, true);
        assert!(Flag::Utc.get(&config));
        assert!(!Flag::Enabled.get(&config));
    }

    fn arb_extra(prefix: &'static str) -> impl Strategy<Value = Map<String, Value>> {
        let value = prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "\\PC{0,12}".prop_map(Value::from),
            Just(Value::Null),
        ];
        prop::collection::vec((proptest::string::string_regex(&format!("{}[a-z]{{0,6}}", prefix)).unwrap(), value), 0..3)
            .prop_map(|entries| entries.into_iter().collect::<Map<String, Value>>())
    }

    fn arb_notification() -> impl Strategy<Value = Notification> {
        (
            (any::<u32>(), any::<u32>(), any::<u32>()),
            ("\\PC{0,16}", "\\PC{0,16}", "\\PC{0,8}", "\\PC{0,8}"),
            arb_extra("x"),
        )
            .prop_map(|((hour, minute, second), (title, text, icon, color), extra)| Notification {
                hour,
                minute,
                second,
                title,
                text,
                icon,
                color,
                extra,
            })
    }

    fn arb_configuration() -> impl Strategy<Value = Configuration> {
        (
            any::<i64>(),
            (any::<bool>(), any::<bool>(), any::<bool>()),
            prop::collection::vec(arb_notification(), 0..6),
            arb_extra("z"),
        )
            .prop_map(|(version, (enabled, use_utc, use_mission_time), notifications, extra)| Configuration {
                version,
                enabled,
                use_utc,
                use_mission_time,
                notifications,
                extra,
            })
    }

    proptest! {
        /// Serializing, loading and serializing again gives the same bytes and document.
        #[test]
        fn prop_round_trip_stable(config in arb_configuration()) {
            let first = config.serialize().unwrap();
            let reloaded = Configuration::load(&first).unwrap();
            prop_assert_eq!(&reloaded, &config);
            prop_assert_eq!(reloaded.serialize().unwrap(), first);
        }

        /// Any time triple is either stored in range or refused with the record untouched.
        #[test]
        fn prop_update_keeps_times_in_bounds(
            config in arb_configuration(),
            slot in any::<prop::sample::Index>(),
            hour in any::<u32>(),
            minute in 0u32..120,
            second in prop_oneof![0u32..120, any::<u32>()],
        ) {
            let mut config = config;
            let index = config.add_notification();
            let index = slot.index(index + 1);
            let before = config.notifications[index].clone();
            let fields = NotificationFields { hour, minute, second, title: "t".into(), ..Default::default() };

            let in_range = hour <= 23 && minute <= 59 && second <= 59;
            match config.update_notification(index, fields) {
                Ok(()) => {
                    prop_assert!(in_range);
                    let record = &config.notifications[index];
                    prop_assert_eq!((record.hour, record.minute, record.second), (hour, minute, second));
                }
                Err(EditorError::Validation { .. }) => {
                    prop_assert!(!in_range);
                    prop_assert_eq!(&config.notifications[index], &before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        /// Add grows the list by one default record and leaves the rest alone.
        #[test]
        fn prop_add_appends_one_default(config in arb_configuration()) {
            let mut config = config;
            let before = config.notifications.clone();
            let index = config.add_notification();
            prop_assert_eq!(index, before.len());
            prop_assert_eq!(config.notifications.len(), before.len() + 1);
            prop_assert_eq!(&config.notifications[index], &Notification::default());
            prop_assert_eq!(&config.notifications[..index], &before[..]);
        }

        /// Delete removes exactly the chosen record and keeps the others in order.
        #[test]
        fn prop_delete_removes_only_target(
            notifications in prop::collection::vec(arb_notification(), 1..8),
            slot in any::<prop::sample::Index>(),
        ) {
            let mut config = Configuration { notifications, ..Configuration::default() };
            let mut expected = config.notifications.clone();
            let index = slot.index(expected.len());
            let target = expected.remove(index);

            let removed = config.delete_notification(index).unwrap();
            prop_assert_eq!(removed, target);
            prop_assert_eq!(config.notifications, expected);
        }
    }
}
