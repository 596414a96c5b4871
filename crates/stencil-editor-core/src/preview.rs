//! Preview of a template with example values substituted.
//!
//! Each variable in the registry gets its own hue for this render. Hues are
//! drawn uniformly and redrawn on collision; there is no stable color per
//! variable across renders.

use std::collections::HashSet;
use std::fmt::Write;

use pulldown_cmark_escape::{FmtWriter, escape_html_body_text};
use rand::Rng;
use smol_str::SmolStr;

use crate::config::EditorConfig;
use crate::convert::placeholders;
use crate::variable::{VariableDescriptor, VariableRegistry};

/// Size of the hue circle in degrees.
const HUE_RANGE: u16 = 360;

/// Rendered preview markup plus the hue picked for each variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub markup: String,
    pub colors: Vec<(SmolStr, u16)>,
}

impl Preview {
    pub fn hue_of(&self, name: &str) -> Option<u16> {
        self.colors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, hue)| *hue)
    }
}

/// Render a preview with the thread-local RNG and default settings.
pub fn render_preview(raw: &str, variables: &VariableRegistry) -> Preview {
    render_preview_with_rng(raw, variables, &EditorConfig::default(), &mut rand::rng())
}

pub fn render_preview_with_rng<R: Rng>(
    raw: &str,
    variables: &VariableRegistry,
    config: &EditorConfig,
    rng: &mut R,
) -> Preview {
    let colors = assign_hues(variables, config.max_hue_attempts, rng);

    let mut markup = String::with_capacity(raw.len() * 2);
    let mut last = 0;
    for placeholder in placeholders(raw) {
        let Some(descriptor) = variables.get(placeholder.name) else {
            // Unknown placeholders stay as written.
            continue;
        };
        let hue = colors
            .iter()
            .find(|(name, _)| *name == placeholder.name)
            .map(|(_, hue)| *hue)
            .unwrap_or_default();
        let _ = escape_html_body_text(FmtWriter(&mut markup), &raw[last..placeholder.range.start]);
        write_highlight(&mut markup, descriptor, &config.preview_color(hue));
        last = placeholder.range.end;
    }
    let _ = escape_html_body_text(FmtWriter(&mut markup), &raw[last..]);

    Preview { markup, colors }
}

/// Draw a distinct hue for every variable, in registry order.
fn assign_hues<R: Rng>(
    variables: &VariableRegistry,
    max_attempts: u32,
    rng: &mut R,
) -> Vec<(SmolStr, u16)> {
    let mut taken = HashSet::with_capacity(variables.len());
    let mut colors = Vec::with_capacity(variables.len());
    for descriptor in variables {
        let mut hue = rng.random_range(0..HUE_RANGE);
        let mut attempts = 1;
        while taken.contains(&hue) && attempts < max_attempts {
            hue = rng.random_range(0..HUE_RANGE);
            attempts += 1;
        }
        if taken.contains(&hue) {
            tracing::warn!(
                target: "stencil::preview",
                name = %descriptor.name,
                hue,
                attempts,
                "no free hue found, reusing one"
            );
        }
        taken.insert(hue);
        colors.push((descriptor.name.clone(), hue));
    }
    colors
}

fn write_highlight(out: &mut String, descriptor: &VariableDescriptor, color: &str) {
    let _ = write!(out, "<u style=\"color: {color};border-color: {color};\">");
    if descriptor.example.is_empty() {
        out.push('[');
        let _ = escape_html_body_text(FmtWriter(&mut *out), &descriptor.label);
        out.push(']');
    } else {
        let _ = escape_html_body_text(FmtWriter(&mut *out), &descriptor.example);
    }
    out.push_str("</u>");
}
