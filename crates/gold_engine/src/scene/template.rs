//! Scene template expansion
//!
//! Scene files are Jinja templates (rendered with `minijinja`) that produce a
//! JSON or RON document. Templates see the window size and a few arithmetic
//! helpers, so placements can be written relative to the visible area:
//!
//! ```text
//! "Position": { "X": {{ divide(game_width(), 2) }}, "Y": {{ divide(game_height(), 2) }} }
//! ```
//!
//! | name | value |
//! |---|---|
//! | `window_width`, `window_height` | window size in pixels |
//! | `scale` | pixels per game unit |
//! | `game_width()`, `game_height()` | visible area in game units |
//! | `add`, `subtract`, `multiply`, `divide` | arithmetic on two numbers |
//!
//! Referencing anything else is an error.

use minijinja::{context, Environment, Error, ErrorKind, UndefinedBehavior};

use crate::foundation::math::Viewport;

/// Values a scene template is rendered against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateContext {
    /// Current window size
    pub viewport: Viewport,
}

impl TemplateContext {
    /// Context for a window of the given viewport
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let viewport = self.viewport;
        env.add_function("game_width", move || f64::from(viewport.game_width()));
        env.add_function("game_height", move || f64::from(viewport.game_height()));
        env.add_function("add", |a: f64, b: f64| a + b);
        env.add_function("subtract", |a: f64, b: f64| a - b);
        env.add_function("multiply", |a: f64, b: f64| a * b);
        env.add_function("divide", |a: f64, b: f64| {
            if b == 0.0 {
                Err(Error::new(ErrorKind::InvalidOperation, "division by zero"))
            } else {
                Ok(a / b)
            }
        });
        env
    }

    /// Render `source` under `name` (used in error messages)
    pub fn render(&self, name: &str, source: &str) -> Result<String, Error> {
        let viewport = self.viewport;
        self.environment().render_named_str(
            name,
            source,
            context! {
                window_width => viewport.width,
                window_height => viewport.height,
                scale => f64::from(viewport.scale()),
            },
        )
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new(Viewport::new(800, 600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_and_window_values() {
        let ctx = TemplateContext::default();
        let out = ctx
            .render(
                "t",
                "{{ game_width() }} {{ game_height() }} {{ divide(10, 4) }} {{ subtract(3, 1) }} {{ window_width }}",
            )
            .unwrap();
        let values: Vec<f64> = out.split(' ').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values, vec![100.0, 75.0, 2.5, 2.0, 800.0]);
    }

    #[test]
    fn test_undefined_names_fail() {
        let ctx = TemplateContext::default();
        assert!(ctx.render("t", "{{ missing }}").is_err());
        assert!(ctx.render("t", "{{ nope(1) }}").is_err());
    }

    #[test]
    fn test_divide_by_zero_fails() {
        assert!(TemplateContext::default().render("t", "{{ divide(1, 0) }}").is_err());
    }

    #[test]
    fn test_syntax_error_fails() {
        assert!(TemplateContext::default().render("t", "{{ divide(1, }}").is_err());
    }
}
