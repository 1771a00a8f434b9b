pub mod gradient;
mod state;
pub mod subscription;
pub mod theme;
mod ui;
pub mod window;

pub use gradient::{build_gradient, ColorRamp, GradientStop, RenderArea};
pub use state::*;
pub use subscription::{SampleInbox, Subscription, SubscriptionHandle};
pub use theme::ChartTheme;
pub use ui::show;
pub use window::SlidingWindow;
