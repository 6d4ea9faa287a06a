//! # 日付・時刻パターン
//!
//! `yyyy-MM-dd` 形式のパターン文字列を、chrono のフォーマット項目列にコンパイルする。
//!
//! ## 対応するパターン文字
//!
//! | 文字 | 意味 | 幅 |
//! |------|------|----|
//! | `y` / `u` | 年 | 2 = 下 2 桁、それ以外 = 西暦全桁 |
//! | `M` | 月 | 1 = 詰めなし、2 = 0 詰め、3 = 略称、4 = 正式名 |
//! | `d` | 日 | 1 / 2 |
//! | `E` | 曜日 | 1〜3 = 略称、4 = 正式名 |
//! | `H` | 時（0〜23） | 1 / 2 |
//! | `h` | 時（1〜12） | 1 / 2 |
//! | `m` | 分 | 1 / 2 |
//! | `s` | 秒 | 1 / 2 |
//! | `S` | 秒の小数部（`s` が必須） | 3 / 6 / 9 |
//! | `a` | 午前・午後（AM/PM） | 1 |
//!
//! `'...'` で囲んだ部分はリテラル、`''` は単一の引用符。英字以外の文字はそのままリテラルになる。
//!
//! ## 不変条件
//!
//! 1 つの [`TemporalPattern`] はエンコードとデコードで同じ項目列を使う。
//! コンパイル時に型ごとの必須フィールドを検査するため、
//! コンパイル済みパターンでのフォーマットは失敗しない。

use std::{collections::BTreeSet, fmt, marker::PhantomData};

use chrono::{
   NaiveDate,
   NaiveDateTime,
   NaiveTime,
   format::{Item, ParseResult, Parsed, StrftimeItems},
};
use thiserror::Error;

/// パターンの対象となる値の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
   Date,
   Time,
   DateTime,
}

impl fmt::Display for TemporalKind {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::Date => write!(f, "日付"),
         Self::Time => write!(f, "時刻"),
         Self::DateTime => write!(f, "日時"),
      }
   }
}

/// パターン中に現れるフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
   Year,
   Month,
   Day,
   Weekday,
   Hour,
   Hour12,
   Meridiem,
   Minute,
   Second,
   Fraction,
}

impl Field {
   fn is_date_field(self) -> bool {
      matches!(self, Self::Year | Self::Month | Self::Day | Self::Weekday)
   }
}

impl fmt::Display for Field {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let name = match self {
         Self::Year => "年",
         Self::Month => "月",
         Self::Day => "日",
         Self::Weekday => "曜日",
         Self::Hour => "時",
         Self::Hour12 => "時（12 時間制）",
         Self::Meridiem => "午前・午後",
         Self::Minute => "分",
         Self::Second => "秒",
         Self::Fraction => "秒の小数部",
      };
      f.write_str(name)
   }
}

/// パターンのコンパイルエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
   #[error("パターンが空です")]
   Empty,

   #[error("位置 {position} のパターン文字 '{letter}' には対応していません")]
   UnsupportedLetter { letter: char, position: usize },

   #[error("パターン文字 '{letter}' の {count} 文字連続には対応していません")]
   UnsupportedWidth { letter: char, count: usize },

   #[error("位置 {position} から始まる引用符が閉じられていません")]
   UnterminatedQuote { position: usize },

   #[error("{kind}のパターンに{field}がありません")]
   MissingField { kind: TemporalKind, field: Field },

   #[error("{kind}のパターンに{field}は使えません")]
   ForbiddenField { kind: TemporalKind, field: Field },
}

/// パターンに一致しない文字列をデコードしようとした
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' は{kind}のパターン '{pattern}' に一致しません: {reason}")]
pub struct TemporalParseError {
   pub input:   String,
   pub pattern: String,
   pub kind:    TemporalKind,
   pub reason:  String,
}

/// パターンでエンコード・デコードできる値
pub trait Temporal: Sized {
   const KIND: TemporalKind;

   fn format_items(&self, items: &[Item<'static>]) -> String;

   fn from_parsed(parsed: &Parsed) -> ParseResult<Self>;
}

impl Temporal for NaiveDate {
   const KIND: TemporalKind = TemporalKind::Date;

   fn format_items(&self, items: &[Item<'static>]) -> String {
      self.format_with_items(items.iter()).to_string()
   }

   fn from_parsed(parsed: &Parsed) -> ParseResult<Self> {
      parsed.to_naive_date()
   }
}

impl Temporal for NaiveTime {
   const KIND: TemporalKind = TemporalKind::Time;

   fn format_items(&self, items: &[Item<'static>]) -> String {
      self.format_with_items(items.iter()).to_string()
   }

   fn from_parsed(parsed: &Parsed) -> ParseResult<Self> {
      parsed.to_naive_time()
   }
}

impl Temporal for NaiveDateTime {
   const KIND: TemporalKind = TemporalKind::DateTime;

   fn format_items(&self, items: &[Item<'static>]) -> String {
      self.format_with_items(items.iter()).to_string()
   }

   fn from_parsed(parsed: &Parsed) -> ParseResult<Self> {
      parsed.to_naive_datetime_with_offset(0)
   }
}

/// コンパイル済みの日付・時刻パターン
///
/// 型パラメータ `T` ごとに必須フィールドが検査済みであることを保証する。
pub struct TemporalPattern<T> {
   source: String,
   items:  Vec<Item<'static>>,
   _kind:  PhantomData<fn() -> T>,
}

impl<T: Temporal> TemporalPattern<T> {
   /// パターン文字列をコンパイルする
   pub fn compile(pattern: &str) -> Result<Self, PatternError> {
      if pattern.is_empty() {
         return Err(PatternError::Empty);
      }

      let (items, fields) = tokenize(pattern)?;
      validate_fields(T::KIND, &fields)?;

      Ok(Self {
         source: pattern.to_string(),
         items,
         _kind: PhantomData,
      })
   }

   /// コンパイル元のパターン文字列
   pub fn source(&self) -> &str {
      &self.source
   }

   /// 値を文字列にエンコードする
   pub fn format(&self, value: &T) -> String {
      value.format_items(&self.items)
   }

   /// 文字列から値をデコードする
   pub fn parse(&self, input: &str) -> Result<T, TemporalParseError> {
      let mut parsed = Parsed::new();
      chrono::format::parse(&mut parsed, input, self.items.iter())
         .and_then(|()| T::from_parsed(&parsed))
         .map_err(|e| TemporalParseError {
            input:   input.to_string(),
            pattern: self.source.clone(),
            kind:    T::KIND,
            reason:  e.to_string(),
         })
   }
}

impl<T> Clone for TemporalPattern<T> {
   fn clone(&self) -> Self {
      Self {
         source: self.source.clone(),
         items:  self.items.clone(),
         _kind:  PhantomData,
      }
   }
}

impl<T> fmt::Debug for TemporalPattern<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_tuple("TemporalPattern").field(&self.source).finish()
   }
}

/// パターン文字列を項目列と出現フィールドに分解する
fn tokenize(pattern: &str) -> Result<(Vec<Item<'static>>, BTreeSet<Field>), PatternError> {
   let chars: Vec<char> = pattern.chars().collect();
   let mut items = Vec::new();
   let mut fields = BTreeSet::new();
   let mut literal = String::new();
   let mut i = 0;

   while i < chars.len() {
      let c = chars[i];

      if c == '\'' {
         if chars.get(i + 1) == Some(&'\'') {
            literal.push('\'');
            i += 2;
            continue;
         }
         let start = i;
         i += 1;
         loop {
            match chars.get(i) {
               None => return Err(PatternError::UnterminatedQuote { position: start }),
               Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                  literal.push('\'');
                  i += 2;
               }
               Some('\'') => {
                  i += 1;
                  break;
               }
               Some(&ch) => {
                  literal.push(ch);
                  i += 1;
               }
            }
         }
         continue;
      }

      if c.is_ascii_alphabetic() {
         let count = chars[i..].iter().take_while(|&&ch| ch == c).count();
         let (spec, field) = specifier(c, count, i)?;
         flush_literal(&mut items, &mut literal);
         items.extend(StrftimeItems::new(spec));
         fields.insert(field);
         i += count;
         continue;
      }

      literal.push(c);
      i += 1;
   }
   flush_literal(&mut items, &mut literal);

   Ok((items, fields))
}

/// 溜まったリテラルを項目として確定する
///
/// 空白は解析時に柔軟にマッチする `OwnedSpace`、それ以外は完全一致の `OwnedLiteral` にする。
fn flush_literal(items: &mut Vec<Item<'static>>, literal: &mut String) {
   let mut rest = literal.as_str();
   while !rest.is_empty() {
      let is_space = rest.starts_with(char::is_whitespace);
      let end = rest
         .find(|ch: char| ch.is_whitespace() != is_space)
         .unwrap_or(rest.len());
      let (run, tail) = rest.split_at(end);
      let run: Box<str> = run.into();
      items.push(if is_space {
         Item::OwnedSpace(run)
      } else {
         Item::OwnedLiteral(run)
      });
      rest = tail;
   }
   literal.clear();
}

/// パターン文字と連続数から strftime 指定子を決める
fn specifier(letter: char, count: usize, position: usize) -> Result<(&'static str, Field), PatternError> {
   let found = match (letter, count) {
      ('y' | 'u', 2) => ("%y", Field::Year),
      ('y' | 'u', 1 | 3 | 4) => ("%Y", Field::Year),
      ('M', 1) => ("%-m", Field::Month),
      ('M', 2) => ("%m", Field::Month),
      ('M', 3) => ("%b", Field::Month),
      ('M', 4) => ("%B", Field::Month),
      ('d', 1) => ("%-d", Field::Day),
      ('d', 2) => ("%d", Field::Day),
      ('E', 1..=3) => ("%a", Field::Weekday),
      ('E', 4) => ("%A", Field::Weekday),
      ('H', 1) => ("%-H", Field::Hour),
      ('H', 2) => ("%H", Field::Hour),
      ('h', 1) => ("%-I", Field::Hour12),
      ('h', 2) => ("%I", Field::Hour12),
      ('m', 1) => ("%-M", Field::Minute),
      ('m', 2) => ("%M", Field::Minute),
      ('s', 1) => ("%-S", Field::Second),
      ('s', 2) => ("%S", Field::Second),
      ('S', 3) => ("%3f", Field::Fraction),
      ('S', 6) => ("%6f", Field::Fraction),
      ('S', 9) => ("%9f", Field::Fraction),
      ('a', 1) => ("%p", Field::Meridiem),
      ('y' | 'u' | 'M' | 'd' | 'E' | 'H' | 'h' | 'm' | 's' | 'S' | 'a', _) => {
         return Err(PatternError::UnsupportedWidth { letter, count });
      }
      _ => return Err(PatternError::UnsupportedLetter { letter, position }),
   };
   Ok(found)
}

/// 対象の種類に対してフィールドの過不足を検査する
fn validate_fields(kind: TemporalKind, fields: &BTreeSet<Field>) -> Result<(), PatternError> {
   let needs_date = matches!(kind, TemporalKind::Date | TemporalKind::DateTime);
   let needs_time = matches!(kind, TemporalKind::Time | TemporalKind::DateTime);

   if let Some(&field) = fields
      .iter()
      .find(|f| if f.is_date_field() { !needs_date } else { !needs_time })
   {
      return Err(PatternError::ForbiddenField { kind, field });
   }

   let mut required = Vec::new();
   if needs_date {
      required.extend([Field::Year, Field::Month, Field::Day]);
   }
   if needs_time {
      if fields.contains(&Field::Hour12) {
         required.push(Field::Meridiem);
      } else {
         required.push(Field::Hour);
      }
      required.push(Field::Minute);
      if fields.contains(&Field::Fraction) {
         required.push(Field::Second);
      }
   }

   match required.into_iter().find(|f| !fields.contains(f)) {
      Some(field) => Err(PatternError::MissingField { kind, field }),
      None => Ok(()),
   }
}
