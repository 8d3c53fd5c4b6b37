pub mod day_view;
pub mod event_form;
pub mod month_view;
pub mod status_bar;

pub use day_view::DayView;
pub use event_form::EventForm;
pub use month_view::MonthView;
pub use status_bar::StatusBar;
