//! # 日付・時刻型
//!
//! ボディに載せる日付・時刻の値型。[`JsonCodec`](super::JsonCodec) の中では
//! 設定されたパターンで、外では chrono 既定の ISO 8601 表現でシリアライズされる。
//!
//! chrono の型をそのままフィールドに持つ場合は `with` モジュールを使う:
//!
//! ```
//! use chrono::NaiveDate;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Notice {
//!    #[serde(with = "mekatok_web::codec::temporal::date")]
//!    publish_on: NaiveDate,
//! }
//! ```

use std::{fmt, ops::Deref};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::{FormatRules, TemporalPattern, with_active_rules};

/// 規則に従って書き出す。コーデックの外では chrono 既定の表現
fn serialize_with<T, S>(
   value: &T,
   serializer: S,
   pick: fn(&FormatRules) -> &TemporalPattern<T>,
) -> Result<S::Ok, S::Error>
where
   T: super::Temporal + Serialize,
   S: Serializer,
{
   match with_active_rules(|rules| pick(rules).format(value)) {
      Some(text) => serializer.serialize_str(&text),
      None => value.serialize(serializer),
   }
}

/// 規則に従って読み込む。コーデックの外では chrono 既定の表現
fn deserialize_with<'de, T, D>(
   deserializer: D,
   pick: fn(&FormatRules) -> &TemporalPattern<T>,
) -> Result<T, D::Error>
where
   T: super::Temporal + std::str::FromStr,
   T::Err: fmt::Display,
   D: Deserializer<'de>,
{
   let text = String::deserialize(deserializer)?;
   match with_active_rules(|rules| pick(rules).parse(&text)) {
      Some(parsed) => parsed.map_err(de::Error::custom),
      None => text.parse().map_err(de::Error::custom),
   }
}

macro_rules! define_temporal {
   (
      $(#[$meta:meta])*
      $vis:vis struct $Name:ident($Inner:ty);
      with = $module:ident, rule = $field:ident;
   ) => {
      $(#[$meta])*
      #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
      $vis struct $Name(pub $Inner);

      impl $Name {
         /// 内部の chrono 値を取り出す
         pub fn into_inner(self) -> $Inner {
            self.0
         }
      }

      impl From<$Inner> for $Name {
         fn from(value: $Inner) -> Self {
            Self(value)
         }
      }

      impl From<$Name> for $Inner {
         fn from(value: $Name) -> Self {
            value.0
         }
      }

      impl Deref for $Name {
         type Target = $Inner;

         fn deref(&self) -> &Self::Target {
            &self.0
         }
      }

      impl fmt::Display for $Name {
         fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(&self.0, f)
         }
      }

      impl Serialize for $Name {
         fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            $module::serialize(&self.0, serializer)
         }
      }

      impl<'de> Deserialize<'de> for $Name {
         fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            $module::deserialize(deserializer).map(Self)
         }
      }

      #[doc = concat!("`", stringify!($Inner), "` を `#[serde(with)]` で直接扱うためのモジュール")]
      pub mod $module {
         use super::*;

         pub fn serialize<S: Serializer>(value: &$Inner, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_with(value, serializer, |rules| &rules.$field)
         }

         pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$Inner, D::Error> {
            deserialize_with(deserializer, |rules| &rules.$field)
         }
      }
   };
}

define_temporal! {
   /// 日付（既定パターン `yyyy-MM-dd`）
   pub struct Date(NaiveDate);
   with = date, rule = date;
}

define_temporal! {
   /// 時刻（既定パターン `HH:mm:ss`）
   pub struct Time(NaiveTime);
   with = time, rule = time;
}

define_temporal! {
   /// 日時（既定パターン `yyyy-MM-dd HH:mm:ss`）
   pub struct DateTime(NaiveDateTime);
   with = date_time, rule = date_time;
}

#[cfg(test)]
mod tests {
   use chrono::Timelike;
   use pretty_assertions::assert_eq;
   use proptest::prelude::*;
   use serde_json::json;

   use super::*;
   use crate::{codec::JsonCodec, config::FormatConfig};

   fn codec() -> JsonCodec {
      JsonCodec::from_config(&FormatConfig::default()).unwrap()
   }

   #[derive(Debug, PartialEq, Serialize, Deserialize)]
   struct Event {
      #[serde(with = "date")]
      held_on: NaiveDate,
      #[serde(with = "date_time")]
      starts:  NaiveDateTime,
   }

   #[test]
   fn test_コーデックの外ではiso8601で書き出す() {
      let value = DateTime(
         NaiveDate::from_ymd_opt(2022, 2, 4)
            .unwrap()
            .and_hms_opt(18, 5, 7)
            .unwrap(),
      );

      assert_eq!(serde_json::to_value(value).unwrap(), json!("2022-02-04T18:05:07"));
   }

   #[test]
   fn test_コーデックの外ではiso8601を読み込む() {
      let date: Date = serde_json::from_value(json!("2022-02-04")).unwrap();

      assert_eq!(date, Date(NaiveDate::from_ymd_opt(2022, 2, 4).unwrap()));
   }

   #[test]
   fn test_withモジュールでchronoの型を直接扱える() {
      let day = NaiveDate::from_ymd_opt(2022, 2, 4).unwrap();
      let event = Event {
         held_on: day,
         starts:  day.and_hms_opt(9, 0, 0).unwrap(),
      };

      let value = codec().to_value(&event).unwrap();

      assert_eq!(value, json!({"held_on": "2022-02-04", "starts": "2022-02-04 09:00:00"}));
      assert_eq!(codec().from_value::<Event>(value).unwrap(), event);
   }

   #[test]
   fn test_日付以外の値はデコードエラー() {
      let result = codec().from_value::<Date>(json!(20220204));

      assert!(result.is_err());
   }

   #[test]
   fn test_newtypeは内部の値に変換できる() {
      let day = NaiveDate::from_ymd_opt(2022, 2, 4).unwrap();
      let date = Date::from(day);

      assert_eq!(date.into_inner(), day);
      assert_eq!(date.to_string(), "2022-02-04");
      assert_eq!(NaiveDate::from(date), day);
   }

   fn arb_date() -> impl Strategy<Value = NaiveDate> {
      (1i32..=9999, 1u32..=12, 1u32..=28)
         .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
   }

   fn arb_time() -> impl Strategy<Value = NaiveTime> {
      (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap())
   }

   proptest! {
      #[test]
      fn test_日付は既定パターンで往復できる(day in arb_date()) {
         let codec = codec();
         let value = codec.to_value(&Date(day)).unwrap();
         prop_assert_eq!(codec.from_value::<Date>(value).unwrap(), Date(day));
      }

      #[test]
      fn test_時刻は既定パターンで往復できる(time in arb_time()) {
         let codec = codec();
         let value = codec.to_value(&Time(time)).unwrap();
         prop_assert_eq!(codec.from_value::<Time>(value).unwrap(), Time(time));
      }

      #[test]
      fn test_日時は既定パターンで往復できる(day in arb_date(), time in arb_time()) {
         let codec = codec();
         let moment = DateTime(day.and_time(time));
         let value = codec.to_value(&moment).unwrap();
         prop_assert_eq!(codec.from_value::<DateTime>(value).unwrap(), moment);
      }

      #[test]
      fn test_秒未満は秒精度のパターンで切り捨てられる(time in arb_time(), nanos in 1u32..1_000_000_000) {
         let codec = codec();
         let precise = time.with_nanosecond(nanos).unwrap();
         let value = codec.to_value(&Time(precise)).unwrap();
         prop_assert_eq!(codec.from_value::<Time>(value).unwrap(), Time(time));
      }
   }
}
