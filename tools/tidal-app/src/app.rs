//! Application lifecycle: build the ring once, then pump input through it.
//!
//! The producer side copies input into the ring in `chunk`-element writes.
//! After every write the consumer walks a snapshot looking for delimiter
//! elements; each complete record is keyed, then committed by handing the
//! delimiter's address back to the ring. Anything after the last delimiter
//! stays uncommitted and is picked up again after the next write. A record
//! longer than the ring loses its oldest bytes to overwrite-oldest.

use std::io::{ErrorKind, Read};

use anyhow::{Context, Result};
use tidal_hash::{mix1, mix2};
use tidal_log::{kdebug, kinfo, ktrace, kwarn};
use tidal_ring::Ring;

use crate::config::AppConfig;

/// Totals for everything [`App::run`] has processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Complete records parsed.
    pub records: usize,
    /// Payload bytes in those records, delimiters excluded.
    pub bytes: usize,
    /// Unread elements dropped by overwrite-oldest, including scanned
    /// elements of a record that was not yet complete.
    pub evicted: usize,
    /// Elements after the last delimiter when input ended.
    pub pending: usize,
    /// Order-sensitive combination of every record key.
    pub digest: u32,
}

/// Key of one record: `mix2` over a rolling `mix1` of its bytes.
pub fn record_key(bytes: &[u8]) -> u32 {
    mix2(bytes.iter().fold(0, |key, &b| mix1(key ^ u32::from(b))))
}

/// A ring plus the producer's staging buffer.
pub struct App {
    ring: Ring<Box<[u8]>>,
    staging: Box<[u8]>,
    delimiter: u8,
    summary: Summary,
}

impl App {
    /// Validates `config` and allocates all storage up front.
    pub fn init(config: &AppConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let delimiter = config.delimiter_byte()?;
        let capacity = config.ring.capacity;
        let elem_size = config.ring.elem_size;

        let ring_bytes = capacity
            .checked_mul(elem_size)
            .context("ring size overflows usize")?;
        let staging_bytes = config
            .consumer
            .chunk
            .checked_mul(elem_size)
            .context("chunk size overflows usize")?;

        let ring = Ring::new(vec![0u8; ring_bytes].into_boxed_slice(), capacity, elem_size);
        kinfo!(
            "ring: {capacity} elements of {elem_size} bytes, delimiter {:?}",
            char::from(delimiter)
        );

        Ok(Self {
            ring,
            staging: vec![0u8; staging_bytes].into_boxed_slice(),
            delimiter,
            summary: Summary::default(),
        })
    }

    /// Reads `reader` to the end and returns the running totals.
    pub fn run(&mut self, mut reader: impl Read) -> Result<Summary> {
        let es = self.ring.elem_size();
        let mut filled = 0;

        loop {
            let n = match reader.read(&mut self.staging[filled..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err).context("failed to read input"),
            };
            filled += n;

            let whole = filled / es * es;
            if whole > 0 {
                let free = self.ring.free();
                let written = self.ring.write(&self.staging[..whole]);
                let evicted = written.saturating_sub(free);
                if evicted > 0 {
                    kdebug!("producer: {evicted} unread elements overwritten");
                    self.summary.evicted += evicted;
                }
                self.consume()?;
            }

            self.staging.copy_within(whole..filled, 0);
            filled -= whole;
        }

        if filled > 0 {
            kwarn!("dropping {filled} trailing bytes that do not fill an element");
        }
        self.summary.pending = self.ring.available();
        if self.summary.pending > 0 {
            kwarn!(
                "{} elements after the last delimiter",
                self.summary.pending
            );
        }
        Ok(self.summary)
    }

    /// Totals so far.
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Parses and commits every complete record currently in the ring.
    fn consume(&mut self) -> Result<()> {
        let es = self.ring.elem_size();
        let mut snap = self.ring.snapshot();

        loop {
            let mut key = 0u32;
            let mut len = 0;
            let mut delim = None;

            'scan: while let Some(span) = snap.next_span(&self.ring) {
                for elem in span.chunks_exact(es) {
                    if elem[0] == self.delimiter {
                        delim = Some(elem.as_ptr());
                        break 'scan;
                    }
                    key = elem.iter().fold(key, |k, &b| mix1(k ^ u32::from(b)));
                    len += es;
                }
            }

            let Some(delim) = delim else {
                return Ok(());
            };

            // The span scan overshot; resume right after the delimiter.
            snap.seek_to(&self.ring, delim)
                .context("delimiter not in snapshot")?;
            let used = self
                .ring
                .commit_to(delim)
                .context("delimiter not in live range")?;

            let key = mix2(key);
            ktrace!(
                "record {}: {len} bytes, {used} elements, key {key:#010x}",
                self.summary.records
            );
            self.summary.records += 1;
            self.summary.bytes += len;
            self.summary.digest = mix2(self.summary.digest ^ key);
        }
    }
}
