use std::collections::HashMap;
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// One bar per wave on stderr; stdout keeps only the results.
pub(crate) struct HumanProgress {
    inner: Mutex<Inner>,
}

struct Inner {
    multi: MultiProgress,
    bars: HashMap<String, ProgressBar>,
}

impl HumanProgress {
    pub(crate) fn new() -> Self {
        let multi = MultiProgress::new();
        multi.set_draw_target(ProgressDrawTarget::stderr_with_hz(5));

        Self {
            inner: Mutex::new(Inner {
                multi,
                bars: HashMap::new(),
            }),
        }
    }

    pub(crate) fn update(&self, wave: &str, completed: u64, total: u64, message: String) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let pb = inner.get_or_create_bar(wave, total);
        pb.set_message(message);
        pb.set_position(completed.min(total));
    }

    /// Clears the wave's bar so the wave result prints below a clean line.
    pub(crate) fn finish(&self, wave: &str) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(pb) = inner.bars.remove(wave) {
            pb.finish_and_clear();
        }
    }

    pub(crate) fn finish_all(&self) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for (_, pb) in inner.bars.drain() {
            pb.finish_and_clear();
        }

        let _ = inner.multi.clear();
    }
}

impl Inner {
    fn get_or_create_bar(&mut self, wave: &str, total: u64) -> &ProgressBar {
        let multi = &self.multi;
        self.bars.entry(wave.to_string()).or_insert_with(|| {
            let pb = multi.add(ProgressBar::new(total));
            pb.set_style(bar_style());
            pb.set_prefix(wave.to_string());
            pb
        })
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} [ {bar:20.cyan/blue} ] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
}
