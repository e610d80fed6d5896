#![no_std]

//! A declarative decoder from flat byte buffers into typed Rust records.
//!
//! A destination describes its own wire layout: primitives occupy their fixed
//! width, arrays and vectors their elements in order, and records their fields
//! in declaration order. Decoding walks this layout over a byte slice in the
//! selected [`ByteOrder`], writing into the destination as it goes.
//!
//! Most users should begin with the [`Record`](macro@Record) derive macro and
//! the [`decode`] function:
//!
//! ```
//! use bytelayout::{ByteOrder, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct Header {
//!     version: u8,
//!     #[layout(padding)]
//!     _reserved: u8,
//!     length: u16,
//!     #[layout(length = 4)]
//!     tag: String,
//! }
//!
//! let mut header = Header::default();
//! let consumed = bytelayout::decode(&mut header, b"\x01\x00\x00\x08AB\0\0", ByteOrder::Big)?;
//! assert_eq!(consumed, 8);
//! assert_eq!(header.tag, "AB");
//! # Ok::<(), bytelayout::Error>(())
//! ```
//!
//! Records with fields that need custom treatment delegate them to hooks (see
//! the [`hook`] module). Destinations of shapes known only at runtime can be
//! held in dynamic slots, `Box<dyn Decode>` or `Option<Box<dyn Decode>>`,
//! which decode into whatever concrete value they hold.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable the derive macro (default).
//! - `tracing`: emit a `trace` event for every record field decoded.

extern crate alloc;

pub mod decode;
pub mod descriptor;
pub mod hook;
pub mod order;
pub mod target;

pub use decode::{Error, Reader, decode, decode_exact, decode_text};
pub use descriptor::{FieldDescriptor, FieldKind, Kind, RecordLayout, Shape, TypeDescriptor, Width};
pub use order::ByteOrder;
pub use target::{Decode, FieldTarget, Record, Sequence, Target};

/// Derive [`Record`] and [`Decode`] for a struct.
///
/// _Requires Cargo feature `derive`._
///
/// Fields are decoded in declaration order. Numeric, array, vector and record
/// fields recurse into their own shape, and `String` fields are read as
/// fixed-length text. The `layout` attribute adjusts how a field is treated:
///
/// - `#[layout(ignore)]` (or `ignore = "true"`): the field is left untouched
///   and occupies no bytes on the wire.
/// - `#[layout(padding)]`: the field is left untouched but occupies the static
///   size of its type, skipping over bytes reserved on the wire.
/// - `#[layout(length = N)]` (or `length = "N"`): the number of bytes of a
///   `String` field. Trailing NUL bytes are trimmed.
/// - `#[layout(hook = "encode_name, decode_name")]`: the field is decoded by
///   calling the record's `decode_name` method with the remaining bytes.
///
/// ```
/// use bytelayout::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct Waypoint {
///     #[layout(ignore)]
///     cached_label: Option<String>,
///     latitude: i32,
///     longitude: i32,
///     #[layout(length = 16)]
///     name: String,
///     #[layout(hook = "encode_flags, decode_flags")]
///     flags: Vec<bool>,
/// }
///
/// impl Waypoint {
///     fn decode_flags(&mut self, r: &[u8]) -> Result<usize, bytelayout::Error> {
///         let [count, ..] = r else {
///             return Err(bytelayout::Error::codec("missing flag count"));
///         };
///         self.flags = r[1..].iter().take(*count as usize).map(|b| *b != 0).collect();
///         Ok(1 + self.flags.len())
///     }
/// }
/// ```
#[cfg(feature = "derive")]
pub use bytelayout_derive::Record;
