//! Synthetic identity pool
//!
//! Generates plausible device/interest records to rank queries against when
//! no real population is available. Pass a seeded RNG for reproducible pools.

use crate::thumbmark::compute_thumbmark;
use crate::value::{TraitRecord, TraitValue};
use rand::seq::SliceRandom;
use rand::Rng;

const OS: [&str; 5] = ["Windows 10", "Windows 11", "macOS 14", "Ubuntu 22.04", "Arch Linux"];
const GPUS: [&str; 5] = ["RTX 4090", "GTX 1660", "Intel Iris", "AMD 5700XT", "Apple M2 GPU"];
const CPUS: [&str; 5] = ["Intel i9", "Intel i7", "Ryzen 9", "Ryzen 7", "Apple M2 CPU"];
const APPS: [&str; 6] = ["Discord", "Steam", "Spotify", "Editor", "GameClient", "PhotoTool"];
const FONTS: [&str; 5] = ["Arial", "Verdana", "Roboto", "Fira Code", "Times"];
const HOBBIES: [&str; 4] = ["gaming", "painting", "music", "coding"];
const FOODS: [&str; 4] = ["pizza", "ramen", "tacos", "salad"];

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&str]) -> TraitValue {
    TraitValue::from(pool[rng.random_range(0..pool.len())])
}

/// Between `min` and `max` distinct entries of `pool`, in random order
fn sample<R: Rng + ?Sized>(rng: &mut R, pool: &[&str], min: usize, max: usize) -> TraitValue {
    let n = rng.random_range(min..=max).min(pool.len());
    let mut items = pool.to_vec();
    items.shuffle(rng);
    items.truncate(n);
    TraitValue::from(items)
}

/// Generate `count` identities, each with an `id` and a trailing `thumbmark`
pub fn generate_synthetic_identities<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<TraitRecord> {
    (0..count)
        .map(|i| {
            let mut record = TraitRecord::new();
            record.insert("id".into(), TraitValue::String(format!("user_{}", i)));
            record.insert("os".into(), pick(rng, &OS));
            record.insert("gpu".into(), pick(rng, &GPUS));
            record.insert("cpu".into(), pick(rng, &CPUS));
            record.insert("apps".into(), sample(rng, &APPS, 1, 4));
            record.insert("fonts".into(), sample(rng, &FONTS, 1, 4));
            record.insert("hobbies".into(), sample(rng, &HOBBIES, 1, 3));
            record.insert("foods".into(), sample(rng, &FOODS, 1, 3));
            record.insert("cats".into(), TraitValue::from(rng.random_range(0..40u32)));
            record.insert("shoeSize".into(), TraitValue::from(rng.random_range(6..=13u32)));

            let thumbmark = compute_thumbmark(&record);
            record.insert("thumbmark".into(), TraitValue::String(thumbmark));
            record
        })
        .collect()
}
