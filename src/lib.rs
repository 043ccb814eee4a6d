// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! `cellgc`: a small, non-moving, mark-sweep garbage collector over a
//! fixed-size arena of tagged, address-sized cells.
//!
//! The host owns the object model entirely: `cellgc` only knows about
//! cells, tags and two per-cell bits (`PTR`, `CONT`) that tell the
//! collector where the next pointer field lives. Tracing is iterative
//! (Deutsch-Schorr-Waite pointer reversal), so the collector's own stack
//! usage is independent of the depth of the object graph it walks.
//!
//! ```
//! use cellgc::{Heap, HeapConfig};
//!
//! let mut heap = Heap::init(HeapConfig::default()).unwrap();
//! let obj = heap.alloc(1, 0);
//! heap.trace(obj);
//! heap.reclaim();
//! heap.flip_epoch();
//! ```

mod address;
mod alloc;
mod config;
mod error;
mod gc;
mod heap;
mod tag;

pub use address::Addr;
pub use config::HeapConfig;
pub use error::ConfigError;
pub use heap::Heap;
pub use tag::Tag;
