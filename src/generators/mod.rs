//! Row pattern generators turning codeword rows into module runs.

pub mod bitfield;
pub mod micro_pdf417;
pub mod pdf417;

pub use bitfield::Bitfield;
pub use micro_pdf417::MicroPDF417Row;

pub type PDF417Row<'a> = pdf417::PDF417Row<'a, false>;
pub type TruncatedPDF417Row<'a> = pdf417::PDF417Row<'a, true>;
