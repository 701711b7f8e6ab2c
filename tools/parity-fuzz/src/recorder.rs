//! Counting mismatches and storing their artifacts.
//!
//! Every mismatch gets a sequence number, so a campaign run with `--store`
//! leaves one set of files per mismatching comparison:
//!
//! - `<prefix>-bug-<NNNNN>.png`: the visual diff
//! - `<prefix>-bug-<NNNNN>-<a>.png` and `...-<b>.png`: both source images

use raster_pipe::Image;
use tracing::{info, warn};

use crate::compare::{self, Comparison};
use crate::store::ImageStore;

#[derive(Debug)]
pub struct MismatchRecorder {
    mismatches: u64,
    store: Option<ImageStore>,
    suffixes: [&'static str; 2],
}

impl MismatchRecorder {
    /// `suffixes` name the two source images, e.g. `["ref", "jit"]`.
    pub fn new(store: Option<ImageStore>, suffixes: [&'static str; 2]) -> Self {
        Self {
            mismatches: 0,
            store,
            suffixes,
        }
    }

    /// Mismatches recorded so far.
    pub fn mismatches(&self) -> u64 {
        self.mismatches
    }

    pub fn artifact_name(prefix: &str, sequence: u64) -> String {
        format!("{}-bug-{:05}", prefix, sequence)
    }

    /// Compare `a` with `b`, recording the result if they differ.
    pub fn check(&mut self, prefix: &str, a: &Image, b: &Image) -> Comparison {
        let comparison = compare::compare(a, b);
        match comparison {
            Comparison::Identical => {}
            Comparison::Inconclusive { .. } => {
                warn!("{}: cannot compare images: {}", prefix, comparison);
            }
            Comparison::Mismatch(diff) => {
                self.mismatches += 1;
                let name = Self::artifact_name(prefix, self.mismatches);
                info!("Mismatch: {} ({})", name, diff);
                if let Some(store) = &self.store {
                    self.store_artifacts(store, &name, a, b);
                }
            }
        }
        comparison
    }

    fn store_artifacts(&self, store: &ImageStore, name: &str, a: &Image, b: &Image) {
        let [suffix_a, suffix_b] = self.suffixes;
        if let Some(diff) = compare::diff_image(a, b) {
            save_or_warn(store, name, &diff);
        }
        save_or_warn(store, &format!("{}-{}", name, suffix_a), a);
        save_or_warn(store, &format!("{}-{}", name, suffix_b), b);
    }
}

fn save_or_warn(store: &ImageStore, name: &str, img: &Image) {
    if let Err(e) = store.save(name, img) {
        warn!("{}", e);
    }
}
