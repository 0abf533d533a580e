//! Page capabilities: the timer display and the answer form

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::state::{PageView, Submission, REMAINING_TIME_FIELD, TIMEOUT_FLAG_FIELD};

/// The node showing the remaining time.
pub trait TimerDisplay {
    fn set_text(&mut self, text: &str);

    /// Remove the "loading" placeholder shown until playback starts.
    fn remove_loading_indicator(&mut self);

    fn set_color(&mut self, color: &str);
}

/// The answer form posted at the end of the quiz.
pub trait AnswerForm {
    fn has_field(&self, name: &str) -> bool;

    /// Write a field value; writing a field the form lacks is ignored.
    fn set_field(&mut self, name: &str, value: &str);

    /// Post the form as it currently is.
    fn submit(&mut self);
}

/// Display and form of a page living on the other side of HTTP.
///
/// Clones share the same view.
#[derive(Debug, Clone)]
pub struct RemotePage {
    view: Arc<Mutex<PageView>>,
}

impl RemotePage {
    /// Page whose form has `remaining_time`, `answer` and, when
    /// `timeout_flag` is set, the timeout flag field.
    pub fn new(timeout_flag: bool) -> Self {
        let mut fields = vec![REMAINING_TIME_FIELD, crate::state::ANSWER_FIELD];
        if timeout_flag {
            fields.push(TIMEOUT_FLAG_FIELD);
        }
        Self::with_view(PageView::new(fields))
    }

    pub fn with_view(view: PageView) -> Self {
        Self {
            view: Arc::new(Mutex::new(view)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> PageView {
        self.lock().clone()
    }
}

impl TimerDisplay for RemotePage {
    fn set_text(&mut self, text: &str) {
        self.lock().display_text = text.to_string();
    }

    fn remove_loading_indicator(&mut self) {
        self.lock().loading = false;
    }

    fn set_color(&mut self, color: &str) {
        let mut view = self.lock();
        if view.color.as_deref() != Some(color) {
            debug!("Display color set to {}", color);
            view.color = Some(color.to_string());
        }
    }
}

impl AnswerForm for RemotePage {
    fn has_field(&self, name: &str) -> bool {
        self.lock().fields.contains_key(name)
    }

    fn set_field(&mut self, name: &str, value: &str) {
        let mut view = self.lock();
        match view.fields.get_mut(name) {
            Some(field) => *field = value.to_string(),
            None => debug!("Form has no '{}' field, write skipped", name),
        }
    }

    fn submit(&mut self) {
        let mut view = self.lock();
        if view.is_submitted() {
            warn!("Form already submitted, ignoring second submit");
            return;
        }
        let submission = Submission::from_fields(view.fields.clone());
        info!("Form submitted: {}", submission.message);
        view.submission = Some(submission);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ANSWER_FIELD;

    #[test]
    fn timeout_flag_field_is_optional() {
        assert!(RemotePage::new(true).has_field(TIMEOUT_FLAG_FIELD));
        let page = RemotePage::new(false);
        assert!(!page.has_field(TIMEOUT_FLAG_FIELD));
        assert!(page.has_field(REMAINING_TIME_FIELD));
        assert!(page.has_field(ANSWER_FIELD));
    }

    #[test]
    fn writes_to_missing_fields_are_skipped() {
        let mut page = RemotePage::new(false);
        page.set_field(TIMEOUT_FLAG_FIELD, "true");
        assert!(!page.view().fields.contains_key(TIMEOUT_FLAG_FIELD));
    }

    #[test]
    fn submit_freezes_the_posted_fields() {
        let mut page = RemotePage::new(true);
        page.set_field(REMAINING_TIME_FIELD, "12.5");
        page.set_field(ANSWER_FIELD, "3");
        page.submit();
        page.set_field(REMAINING_TIME_FIELD, "12.4");
        page.submit();

        let view = page.view();
        let submission = view.submission.expect("submitted");
        assert_eq!(submission.fields[REMAINING_TIME_FIELD], "12.5");
        assert_eq!(submission.fields[ANSWER_FIELD], "3");
        assert!(!submission.timed_out);
    }

    #[test]
    fn clones_share_the_display() {
        let page = RemotePage::new(true);
        let mut display = page.clone();
        display.set_text("19.9");
        display.remove_loading_indicator();
        display.set_color("#CC0000");

        let view = page.view();
        assert_eq!(view.display_text, "19.9");
        assert!(!view.loading);
        assert_eq!(view.color.as_deref(), Some("#CC0000"));
    }
}
