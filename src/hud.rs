//! HUD capability and the text HUD
//!
//! Gameplay pushes state into a [`Hud`] and never reads it back. [`TextHud`]
//! turns those calls into the localized strings a host draws.

use crate::consts::INFO_FADE_SECS;
use crate::format_template;
use crate::localization::{Localization, StringTable};
use crate::sim::{CountdownDisplay, PlayerRank, PropTag};

/// Fire-and-forget display calls made by the gameplay session
pub trait Hud {
    fn update_hud(&mut self, elapsed: f32, rank: PlayerRank, remaining: u32, stage: PropTag);
    fn show_countdown(&mut self, display: CountdownDisplay);
    /// Show a localized info message for `duration` seconds, then fade it
    fn show_info_text(&mut self, key: &str, duration: f32);
    fn show_collection_text(&mut self, num_to_collect: u32, stage: PropTag);
    /// Show the named screen and hide all others ("" hides all)
    fn show_screen(&mut self, name: &str);
    fn show_hud(&mut self, visible: bool);
    fn show_game_over(&mut self) {}
    /// Per-frame housekeeping (fades)
    fn update(&mut self, _dt: f32) {}
    fn set_language(&mut self, _language: &str) {}
}

/// Format seconds as `MM:SS:mmm` (minutes wrap at an hour)
pub fn format_timer(seconds: f32) -> String {
    let total_ms = (seconds.max(0.0) as f64 * 1000.0).round() as u64;
    let minutes = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{minutes:02}:{secs:02}:{millis:03}")
}

/// HUD rendered to localized strings
#[derive(Debug, Clone)]
pub struct TextHud<L: Localization = StringTable> {
    strings: L,
    screens: Vec<String>,
    active_screen: Option<String>,
    hud_visible: bool,
    pub timer_text: String,
    pub count_text: String,
    pub rank_text: String,
    pub countdown_text: String,
    pub info_text: String,
    /// Seconds left before the info text starts fading
    info_display_time: f32,
    /// Seconds left in the fade-out
    info_fade_time: f32,
}

impl<L: Localization> TextHud<L> {
    pub fn new(strings: L, screens: Vec<String>) -> Self {
        Self {
            strings,
            screens,
            active_screen: None,
            hud_visible: true,
            timer_text: String::new(),
            count_text: String::new(),
            rank_text: String::new(),
            countdown_text: String::new(),
            info_text: String::new(),
            info_display_time: 0.0,
            info_fade_time: 0.0,
        }
    }

    pub fn strings(&self) -> &L {
        &self.strings
    }

    pub fn active_screen(&self) -> Option<&str> {
        self.active_screen.as_deref()
    }

    pub fn hud_visible(&self) -> bool {
        self.hud_visible
    }

    /// Info text opacity: 1 while displayed, ramping to 0 over the fade
    pub fn info_opacity(&self) -> f32 {
        if self.info_display_time > 0.0 {
            1.0
        } else if self.info_fade_time > 0.0 {
            self.info_fade_time / INFO_FADE_SECS
        } else {
            0.0
        }
    }

    fn stage_string(&self, stage: PropTag) -> String {
        self.strings.get_string(stage.as_str())
    }

    fn show_info(&mut self, text: String, duration: f32) {
        self.info_text = text;
        self.info_display_time = duration;
        self.info_fade_time = 0.0;
    }
}

impl<L: Localization> Hud for TextHud<L> {
    fn update_hud(&mut self, elapsed: f32, rank: PlayerRank, remaining: u32, stage: PropTag) {
        self.timer_text = format_template(&self.strings.get_string("HUD Time"), &[format_timer(elapsed).as_str()]);

        let rank_name = self.strings.get_string(&rank.localization_key());
        self.rank_text = format_template(&self.strings.get_string("HUD Rank"), &[rank_name.as_str()]);

        let stage_name = self.stage_string(stage);
        self.count_text = format_template(
            &self.strings.get_string("HUD Count"),
            &[stage_name.as_str(), remaining.to_string().as_str()],
        );
    }

    fn show_countdown(&mut self, display: CountdownDisplay) {
        self.countdown_text = match display {
            CountdownDisplay::Number(n) => n.to_string(),
            CountdownDisplay::Go => self.strings.get_string("Go"),
            CountdownDisplay::Hidden => String::new(),
        };
    }

    fn show_info_text(&mut self, key: &str, duration: f32) {
        let text = self.strings.get_string(key);
        self.show_info(text, duration);
    }

    fn show_collection_text(&mut self, num_to_collect: u32, stage: PropTag) {
        let stage_name = self.stage_string(stage);
        let text = format_template(
            &self.strings.get_string("Collection"),
            &[num_to_collect.to_string().as_str(), stage_name.as_str()],
        );
        self.show_info(text, crate::consts::COLLECTION_TEXT_SECS);
    }

    fn show_screen(&mut self, name: &str) {
        self.active_screen = self.screens.iter().find(|s| s.as_str() == name).cloned();
    }

    fn show_hud(&mut self, visible: bool) {
        self.hud_visible = visible;
    }

    fn show_game_over(&mut self) {
        self.countdown_text = self.strings.get_string("Finished");
    }

    fn update(&mut self, dt: f32) {
        if self.info_display_time > 0.0 {
            self.info_display_time -= dt;
            if self.info_display_time <= 0.0 {
                self.info_display_time = 0.0;
                self.info_fade_time = INFO_FADE_SECS;
            }
        } else if self.info_fade_time > 0.0 {
            self.info_fade_time = (self.info_fade_time - dt).max(0.0);
        }
    }

    fn set_language(&mut self, language: &str) {
        self.strings.set_language(language);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! HUD that records calls for session tests

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum HudCall {
        Update {
            rank: PlayerRank,
            remaining: u32,
            stage: PropTag,
        },
        Countdown(CountdownDisplay),
        Info(String, f32),
        Collection(u32, PropTag),
        Screen(String),
        ShowHud(bool),
        GameOver,
        Language(String),
    }

    #[derive(Debug, Default)]
    pub struct RecordingHud {
        pub calls: Vec<HudCall>,
        pub last_elapsed: f32,
    }

    impl RecordingHud {
        pub fn countdowns(&self) -> Vec<CountdownDisplay> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    HudCall::Countdown(d) => Some(*d),
                    _ => None,
                })
                .collect()
        }
    }

    impl Hud for RecordingHud {
        fn update_hud(&mut self, elapsed: f32, rank: PlayerRank, remaining: u32, stage: PropTag) {
            self.last_elapsed = elapsed;
            self.calls.push(HudCall::Update {
                rank,
                remaining,
                stage,
            });
        }

        fn show_countdown(&mut self, display: CountdownDisplay) {
            self.calls.push(HudCall::Countdown(display));
        }

        fn show_info_text(&mut self, key: &str, duration: f32) {
            self.calls.push(HudCall::Info(key.to_string(), duration));
        }

        fn show_collection_text(&mut self, num_to_collect: u32, stage: PropTag) {
            self.calls.push(HudCall::Collection(num_to_collect, stage));
        }

        fn show_screen(&mut self, name: &str) {
            self.calls.push(HudCall::Screen(name.to_string()));
        }

        fn show_hud(&mut self, visible: bool) {
            self.calls.push(HudCall::ShowHud(visible));
        }

        fn show_game_over(&mut self) {
            self.calls.push(HudCall::GameOver);
        }

        fn set_language(&mut self, language: &str) {
            self.calls.push(HudCall::Language(language.to_string()));
        }
    }
}
