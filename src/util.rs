use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn truncated(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

pub fn stable_unit_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let bits = hasher.finish();

    let x = (bits as u32) as f32 / u32::MAX as f32;
    let y = ((bits >> 32) as u32) as f32 / u32::MAX as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
