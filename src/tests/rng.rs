use rand::{Rng, RngCore};

use crate::rng::*;

#[test]
fn cell_stream_matches_reference_splitmix64() {
    let mut rng = CellRng::new(0);
    assert_eq!(rng.next_u64(), 0xe220_a839_7b1d_cdaf);
    assert_eq!(rng.next_u64(), 0x6e78_9e6a_a1b9_65f4);
    assert_eq!(rng.next_u64(), 0x06c4_5d18_8009_454f);
}

#[test]
fn cell_rng_seeds_from_the_hashed_key() {
    let key = hash_key(7, Purpose::Ribbon, 3, -2);
    let mut a = cell_rng(7, Purpose::Ribbon, 3, -2);
    let mut b = CellRng::new(key);
    for _ in 0..4 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn streams_are_repeatable_and_keyed_by_purpose_and_cell() {
    let draw = |purpose, x, y| {
        let mut rng = cell_rng(42, purpose, x, y);
        (0..6).map(|_| rng.random_range(0.0f32..1.0)).collect::<Vec<_>>()
    };
    assert_eq!(draw(Purpose::Blob, 1, 1), draw(Purpose::Blob, 1, 1));
    assert_ne!(draw(Purpose::Blob, 1, 1), draw(Purpose::Tuft, 1, 1));
    assert_ne!(draw(Purpose::Blob, 1, 1), draw(Purpose::Blob, 1, 2));
    assert_ne!(draw(Purpose::Blob, 1, 2), draw(Purpose::Blob, 2, 1));
}

#[test]
fn fill_bytes_spills_the_stream_little_endian() {
    let mut bytes = [0u8; 11];
    CellRng::new(5).fill_bytes(&mut bytes);
    let mut rng = CellRng::new(5);
    let first = rng.next_u64().to_le_bytes();
    let second = rng.next_u64().to_le_bytes();
    assert_eq!(bytes[..8], first);
    assert_eq!(bytes[8..], second[..3]);
}

#[test]
fn noise_seed_depends_on_the_shading_seed() {
    assert_eq!(noise_seed(3), noise_seed(3));
    assert_ne!(noise_seed(3), noise_seed(4));
}
