use crate::event::EventCategory;
use crate::stats::SessionStats;
use crate::storage::{EventStore, StoreError};

/// Per-category row counts, read from the store after the write path
/// has closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub keyboard: u64,
    pub mouse: u64,
    pub gamepad: u64,
}

impl CategoryCounts {
    pub fn from_store<S: EventStore>(store: &S) -> Result<Self, StoreError> {
        Ok(Self {
            keyboard: store.count(Some(EventCategory::Key))?,
            mouse: store.count(Some(EventCategory::Pointer))?,
            gamepad: store.count(Some(EventCategory::Gamepad))?,
        })
    }
}

/// Presentation collaborator, invoked exactly once after the session
/// has stopped. A GUI summary window would implement this same trait.
pub trait Presenter {
    fn show_summary(&self, stats: &SessionStats, counts: &CategoryCounts);
}

pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn show_summary(&self, stats: &SessionStats, counts: &CategoryCounts) {
        println!("{}", render(stats, counts));
    }
}

fn render(stats: &SessionStats, counts: &CategoryCounts) -> String {
    format!(
        "--- Input Tracker Summary ---\n\
         Keyboard inputs:   {}\n\
         Mouse clicks:      {}\n\
         Gamepad inputs:    {}\n\
         Total time:        {:.2} seconds\n\
         Total inputs:      {}\n\
         Inputs per second: {:.2}",
        counts.keyboard,
        counts.mouse,
        counts.gamepad,
        stats.elapsed.as_secs_f64(),
        stats.total_events,
        stats.events_per_second,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputEvent;
    use crate::storage::sqlite::SqliteStore;
    use std::time::Duration;

    #[test]
    fn counts_come_from_the_store_per_category() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert(&InputEvent::new(EventCategory::Key, "Key Pressed: a"))
            .unwrap();
        store
            .insert(&InputEvent::new(EventCategory::Key, "Key Pressed: b"))
            .unwrap();
        store
            .insert(&InputEvent::at(EventCategory::Pointer, 1.0, 1.0, "Mouse Left Pressed"))
            .unwrap();

        let counts = CategoryCounts::from_store(&store).unwrap();
        assert_eq!(
            counts,
            CategoryCounts {
                keyboard: 2,
                mouse: 1,
                gamepad: 0,
            }
        );
    }

    #[test]
    fn summary_renders_every_figure() {
        let stats = SessionStats::derive(120, Duration::from_secs(60));
        let counts = CategoryCounts {
            keyboard: 100,
            mouse: 15,
            gamepad: 5,
        };
        let text = render(&stats, &counts);
        assert!(text.contains("Keyboard inputs:   100"));
        assert!(text.contains("Mouse clicks:      15"));
        assert!(text.contains("Gamepad inputs:    5"));
        assert!(text.contains("Total time:        60.00 seconds"));
        assert!(text.contains("Total inputs:      120"));
        assert!(text.contains("Inputs per second: 2.00"));
    }
}
