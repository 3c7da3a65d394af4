//! Image classification by name hints and proportions.

use stencil_core::{
    geometry::Size,
    semantic::{Tag, TypeKey},
};

/// Name fragments that identify an image's role outright.
const NAME_HINTS: &[(&str, TypeKey)] = &[
    ("avatar", TypeKey::Avatar),
    ("头像", TypeKey::Avatar),
    ("qrcode", TypeKey::Qrcode),
    ("qr", TypeKey::Qrcode),
    ("二维码", TypeKey::Qrcode),
    ("banner", TypeKey::Banner),
    ("logo", TypeKey::Logo),
];

const NAME_HINT_CONFIDENCE: f32 = 0.95;

/// Classifies an image from its element name and canonical size.
///
/// Every matching rule is kept. A photo hit is added only when no other rule
/// fired.
pub(crate) fn classify(name: Option<&str>, size: Size) -> Vec<Tag> {
    let mut hits = Vec::new();

    if let Some(name) = name {
        let lowered = name.to_lowercase();
        if let Some((_, key)) = NAME_HINTS
            .iter()
            .find(|(fragment, _)| lowered.contains(fragment))
        {
            hits.push(Tag::new(*key, NAME_HINT_CONFIDENCE));
        }
    }

    let width = size.width();
    let height = size.height();
    if let Some(ratio) = size.aspect_ratio() {
        let longest = width.max(height);
        let shortest = width.min(height);

        if (0.8..=1.25).contains(&ratio) && shortest >= 50.0 && longest <= 500.0 {
            hits.push(Tag::new(TypeKey::Avatar, 0.9));
        }
        if (0.9..=1.1).contains(&ratio) && shortest >= 80.0 && longest <= 300.0 {
            hits.push(Tag::new(TypeKey::Qrcode, 0.85));
        }
        if ratio > 2.5 && width > 400.0 {
            hits.push(Tag::new(TypeKey::Banner, 0.85));
        }
    }
    if width < 300.0 && height < 150.0 {
        hits.push(Tag::new(TypeKey::Logo, 0.7));
    }

    if hits.is_empty() {
        hits.push(Tag::new(TypeKey::Photo, 0.6));
    }
    hits
}
