//! Headless model of a profile card: what to display, whether the photo can be
//! shown, and which actions are offered. Rendering is left to the UI layer.

use tracing::warn;
use url::Url;

use crate::domain::Profile;
use crate::remote::RecordId;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];
const BADGE_LIMIT: usize = 2;

/// An absolute http(s) URL with a host whose path ends in a known image extension.
pub fn is_valid_image_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return false;
    }
    let path = parsed.path().to_ascii_lowercase();
    path.rsplit_once('.').is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Loading,
    Loaded,
    /// Placeholder avatar shown instead of the photo.
    Fallback,
}

pub type CardHandler = Box<dyn Fn(RecordId) + Send + Sync>;

#[derive(Default)]
pub struct CardHandlers {
    pub on_view: Option<CardHandler>,
    pub on_like: Option<CardHandler>,
    pub on_pass: Option<CardHandler>,
}

pub struct ProfileCard<'a> {
    profile: &'a Profile,
    image: ImageState,
    handlers: CardHandlers,
}

impl<'a> ProfileCard<'a> {
    pub fn new(profile: &'a Profile, handlers: CardHandlers) -> Self {
        let image = match profile.photo.as_deref() {
            Some(url) if is_valid_image_url(url) => ImageState::Loading,
            _ => ImageState::Fallback,
        };
        Self { profile, image, handlers }
    }

    pub fn image(&self) -> ImageState {
        self.image
    }

    pub fn image_loaded(&mut self) {
        if self.image == ImageState::Loading {
            self.image = ImageState::Loaded;
        }
    }

    pub fn image_failed(&mut self) {
        warn!(photo = ?self.profile.photo, "Failed to load image");
        self.image = ImageState::Fallback;
    }

    pub fn display_name(&self) -> &str {
        non_empty(&self.profile.name).unwrap_or("Unknown")
    }

    /// `"<age> • <location>"`
    pub fn subtitle(&self) -> String {
        let age = self
            .profile
            .age
            .map(|age| age.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let location = non_empty(&self.profile.location).unwrap_or("Unknown");
        format!("{age} • {location}")
    }

    pub fn mbti_label(&self) -> &str {
        self.profile.mbti_type.as_deref().and_then(non_empty).unwrap_or("N/A")
    }

    pub fn bio(&self) -> &str {
        non_empty(&self.profile.bio).unwrap_or("No bio available")
    }

    pub fn match_badge(&self) -> String {
        format!("{}% Match", self.profile.compatibility_score.unwrap_or(0))
    }

    pub fn love_language_badges(&self) -> &[String] {
        let languages = &self.profile.love_languages;
        &languages[..languages.len().min(BADGE_LIMIT)]
    }

    /// Like and pass are offered only as a pair.
    pub fn shows_actions(&self) -> bool {
        self.handlers.on_like.is_some() && self.handlers.on_pass.is_some()
    }

    pub fn like(&self) -> bool {
        self.shows_actions() && dispatch(&self.handlers.on_like, self.profile.id)
    }

    pub fn pass(&self) -> bool {
        self.shows_actions() && dispatch(&self.handlers.on_pass, self.profile.id)
    }

    pub fn view(&self) -> bool {
        dispatch(&self.handlers.on_view, self.profile.id)
    }
}

fn dispatch(handler: &Option<CardHandler>, id: RecordId) -> bool {
    match handler {
        Some(handler) => {
            handler(id);
            true
        }
        None => false,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
