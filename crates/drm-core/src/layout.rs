//! # License Record Layout
//!
//! The single source of truth for where each License field lives in the
//! stored account bytes. Both the binary codec and the owner-scan filter
//! read offsets from here.
//!
//! ```text
//!  0        8     12                               44               60  61
//!  ├────────┼─────┼────────────────────────────────┼────────────────┼───┤
//!  │  tag   │ app │             owner              │  fingerprint   │ b │
//!  └────────┴─────┴────────────────────────────────┴────────────────┴───┘
//! ```
//!
//! Each span is computed from the previous span's end and its own width,
//! so changing a width moves every later offset with it. The total is
//! pinned at compile time to the 61 bytes the deployed program allocates
//! (`8 + 4 + 32 + 16 + 1`). Everything after the tag is the Borsh encoding
//! of [`License`](crate::License), whose field order follows these spans.

use crate::fingerprint::FINGERPRINT_HASH_LEN;
use solana_program::pubkey::PUBKEY_BYTES;

/// A contiguous byte range inside a fixed-width record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    /// Byte offset from the start of the record.
    pub offset: usize,
    /// Width in bytes.
    pub len: usize,
}

impl FieldSpan {
    const fn first(len: usize) -> Self {
        Self { offset: 0, len }
    }

    const fn next(self, len: usize) -> Self {
        Self {
            offset: self.end(),
            len,
        }
    }

    /// One past the last byte of the span.
    pub const fn end(self) -> usize {
        self.offset + self.len
    }

    /// Borrow this span out of a buffer known to hold a full record.
    ///
    /// Callers check the buffer length against [`RecordLayout::LEN`] first.
    pub fn slice(self, record: &[u8]) -> &[u8] {
        &record[self.offset..self.end()]
    }

}

/// Field layout of the License record, in storage order.
#[derive(Debug, Clone, Copy)]
pub struct RecordLayout;

impl RecordLayout {
    /// Record tag (discriminator).
    pub const TAG: FieldSpan = FieldSpan::first(8);
    /// Little-endian `u32` application id.
    pub const APPLICATION_ID: FieldSpan = Self::TAG.next(core::mem::size_of::<u32>());
    /// Owner identity.
    pub const OWNER: FieldSpan = Self::APPLICATION_ID.next(PUBKEY_BYTES);
    /// Truncated machine fingerprint digest.
    pub const FINGERPRINT_HASH: FieldSpan = Self::OWNER.next(FINGERPRINT_HASH_LEN);
    /// Derivation bump.
    pub const BUMP: FieldSpan = Self::FINGERPRINT_HASH.next(1);
    /// Total record width.
    pub const LEN: usize = Self::BUMP.end();
    /// Width of the Borsh-encoded body following the tag.
    pub const BODY_LEN: usize = Self::LEN - Self::TAG.len;
}

const _: () = assert!(RecordLayout::LEN == 61);
const _: () = assert!(RecordLayout::OWNER.offset == 12);
const _: () = assert!(RecordLayout::BODY_LEN == 53);
