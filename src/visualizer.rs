//! The tap toy controller.
//!
//! [`TapVisualizer`] owns all visual state and turns pointer events and due
//! timer tasks into canvas mutations. Collaborators are reached through a
//! short-lived [`Context`] built by the caller for each event.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::Pt;
use crate::canvas::{Canvas, PrimitiveId, TextRasterizer};
use crate::color::Rgba;
use crate::config::VisualizerConfig;
use crate::scheduler::{Due, Scheduler, Task, TaskId};
use crate::stopwatch::{Stopwatch, format_elapsed};
use crate::text::TextTexture;

pub struct Context<'a> {
    pub canvas: &'a mut dyn Canvas,
    pub text: &'a mut dyn TextRasterizer,
    pub timers: &'a mut dyn Scheduler,
}

/// What a pointer-down did after debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tap {
    /// Too close to the previous tap.
    Ignored,
    /// Circle spawned, base color kept.
    Marked,
    /// New base color, then a circle.
    Recolored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub primitive: PrimitiveId,
    /// Top-left corner of the bounding box.
    pub position: [Pt; 2],
    /// Bounding box edge length.
    pub size: Pt,
    pub created_at: Instant,
    pub grown: bool,
}

impl Circle {
    pub fn radius(&self) -> Pt {
        self.size / 2.0
    }
}

struct Label {
    primitive: PrimitiveId,
    texture: Arc<TextTexture>,
}

struct Layers {
    shadows: Vec<PrimitiveId>,
    label: Label,
    background: PrimitiveId,
    stopwatch: Label,
}

pub struct TapVisualizer {
    config: VisualizerConfig,
    rng: StdRng,
    base_color: Rgba,
    background_color: Rgba,
    last_tap: Option<Instant>,
    stopwatch: Stopwatch,
    stopwatch_text: String,
    circles: Vec<Circle>,
    long_press_checks: Vec<TaskId>,
    recurring: Vec<TaskId>,
    layers: Layers,
}

impl TapVisualizer {
    pub fn new(ctx: &mut Context<'_>, config: VisualizerConfig) -> Self {
        Self::with_rng(ctx, config, StdRng::from_entropy())
    }

    /// Builds the controller and creates its static primitives on the canvas.
    pub fn with_rng(ctx: &mut Context<'_>, config: VisualizerConfig, rng: StdRng) -> Self {
        let label_texture =
            ctx.text
                .rasterize(&config.label_text, config.label_font_size, true);
        let shadows = (0..config.label_shadow_layers)
            .map(|_| {
                ctx.canvas.add_textured_rect(
                    label_texture.clone(),
                    config.label_shadow_color,
                    [Pt::ZERO; 2],
                    label_texture.size(),
                )
            })
            .collect();
        let label = Label {
            primitive: ctx.canvas.add_textured_rect(
                label_texture.clone(),
                config.label_color,
                [Pt::ZERO; 2],
                label_texture.size(),
            ),
            texture: label_texture,
        };

        let base_color = config.initial_base_color;
        let background = ctx
            .canvas
            .add_rect(base_color, [Pt::ZERO; 2], [Pt::ZERO; 2]);

        let stopwatch_text = format_elapsed(Duration::ZERO);
        let stopwatch_texture =
            ctx.text
                .rasterize(&stopwatch_text, config.stopwatch_font_size, true);
        let stopwatch = Label {
            primitive: ctx.canvas.add_textured_rect(
                stopwatch_texture.clone(),
                config.stopwatch_color,
                [Pt::ZERO; 2],
                stopwatch_texture.size(),
            ),
            texture: stopwatch_texture,
        };

        let visualizer = Self {
            config,
            rng,
            base_color,
            background_color: base_color,
            last_tap: None,
            stopwatch: Stopwatch::new(),
            stopwatch_text,
            circles: Vec::new(),
            long_press_checks: Vec::new(),
            recurring: Vec::new(),
            layers: Layers {
                shadows,
                label,
                background,
                stopwatch,
            },
        };
        visualizer.layout(ctx);
        visualizer
    }

    pub fn base_color(&self) -> Rgba {
        self.base_color
    }

    /// Color the background shows right now: the base color or a flash.
    pub fn background_color(&self) -> Rgba {
        self.background_color
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn is_running(&self) -> bool {
        self.stopwatch.is_running()
    }

    pub fn session_started_at(&self) -> Option<Instant> {
        self.stopwatch.started_at()
    }

    pub fn stopwatch_text(&self) -> &str {
        &self.stopwatch_text
    }

    pub fn last_tap(&self) -> Option<Instant> {
        self.last_tap
    }

    pub fn pending_long_press_checks(&self) -> usize {
        self.long_press_checks.len()
    }

    /// Stopwatch tick and periodic flash, once the session runs.
    pub fn recurring_tasks(&self) -> &[TaskId] {
        &self.recurring
    }

    pub fn background_primitive(&self) -> PrimitiveId {
        self.layers.background
    }

    pub fn stopwatch_primitive(&self) -> PrimitiveId {
        self.layers.stopwatch.primitive
    }

    pub fn label_primitive(&self) -> PrimitiveId {
        self.layers.label.primitive
    }

    pub fn shadow_primitives(&self) -> &[PrimitiveId] {
        &self.layers.shadows
    }

    pub fn on_pointer_down(&mut self, ctx: &mut Context<'_>, position: [Pt; 2], now: Instant) -> Tap {
        let since_last = self.last_tap.map(|t| now.saturating_duration_since(t));

        let check = ctx
            .timers
            .schedule_once(Task::LongPressCheck, now, self.config.long_press);
        self.long_press_checks.push(check);

        self.start_session(ctx, now);

        if since_last.is_some_and(|d| d < self.config.tap_debounce) {
            tracing::debug!(?since_last, "tap debounced");
            return Tap::Ignored;
        }

        let recolor = since_last.is_none_or(|d| d >= self.config.tap_repeat);
        if recolor {
            self.base_color = Rgba::random(&mut self.rng, self.config.base_alpha);
            self.show_background(ctx, self.base_color);
        }

        self.spawn_circle(ctx, position, now);
        self.last_tap = Some(now);
        tracing::debug!(x = %position[0], y = %position[1], recolor, "tap");

        if recolor { Tap::Recolored } else { Tap::Marked }
    }

    /// Cancels every long-press check still pending.
    pub fn on_pointer_up(&mut self, ctx: &mut Context<'_>) -> usize {
        self.long_press_checks
            .drain(..)
            .filter(|id| ctx.timers.unschedule(*id))
            .count()
    }

    /// Dispatches a task popped from the timer queue.
    pub fn handle_task(&mut self, ctx: &mut Context<'_>, due: Due, now: Instant) {
        match due.task {
            Task::LongPressCheck => {
                self.long_press_checks.retain(|id| *id != due.id);
                self.on_long_press_fire(ctx, now);
            }
            Task::FlashRevert => self.revert_flash(ctx),
            Task::StopwatchTick => self.on_stopwatch_tick(ctx, now),
            Task::PeriodicFlash => self.on_periodic_flash_fire(ctx, now),
        }
    }

    pub fn on_long_press_fire(&mut self, ctx: &mut Context<'_>, now: Instant) {
        tracing::debug!("long press");
        self.flash(ctx, Rgba::WHITE, self.config.long_press_flash_duration, now);
    }

    pub fn on_periodic_flash_fire(&mut self, ctx: &mut Context<'_>, now: Instant) {
        let color = if self.base_color.same_rgb(Rgba::YELLOW) {
            Rgba::PINK
        } else {
            Rgba::YELLOW
        };
        self.flash(ctx, color, self.config.flash_duration, now);
    }

    pub fn on_stopwatch_tick(&mut self, ctx: &mut Context<'_>, now: Instant) {
        let Some(elapsed) = self.stopwatch.elapsed(now) else {
            return;
        };

        self.stopwatch_text = format_elapsed(elapsed);
        let texture = ctx.text.rasterize(
            &self.stopwatch_text,
            self.config.stopwatch_font_size,
            true,
        );
        let id = self.layers.stopwatch.primitive;
        ctx.canvas.set_texture(id, texture.clone());
        ctx.canvas.set_size(id, texture.size());
        self.layers.stopwatch.texture = texture;
        self.layout(ctx);

        self.age_circles(ctx, now);
    }

    /// Expires circles that reached their lifetime. Returns how many were removed.
    ///
    /// An expiring circle first gets its one-time size bump and is removed in
    /// the same pass, so the bump is rarely on screen.
    pub fn age_circles(&mut self, ctx: &mut Context<'_>, now: Instant) -> usize {
        let lifetime = self.config.circle_lifetime;
        let growth = self.config.circle_growth;
        let before = self.circles.len();

        self.circles.retain_mut(|circle| {
            let age = now.saturating_duration_since(circle.created_at);
            if age < lifetime {
                return true;
            }
            if !circle.grown {
                circle.size += growth;
                circle.grown = true;
                ctx.canvas.set_size(circle.primitive, [circle.size; 2]);
            }
            ctx.canvas.remove(circle.primitive);
            false
        });

        before - self.circles.len()
    }

    /// Re-rasterizes both labels, e.g. after the display scale factor changed.
    pub fn refresh_text(&mut self, ctx: &mut Context<'_>) {
        let label = ctx
            .text
            .rasterize(&self.config.label_text, self.config.label_font_size, true);
        for id in self
            .layers
            .shadows
            .iter()
            .chain(std::iter::once(&self.layers.label.primitive))
        {
            ctx.canvas.set_texture(*id, label.clone());
            ctx.canvas.set_size(*id, label.size());
        }
        self.layers.label.texture = label;

        let timer = ctx.text.rasterize(
            &self.stopwatch_text,
            self.config.stopwatch_font_size,
            true,
        );
        ctx.canvas
            .set_texture(self.layers.stopwatch.primitive, timer.clone());
        ctx.canvas
            .set_size(self.layers.stopwatch.primitive, timer.size());
        self.layers.stopwatch.texture = timer;

        self.layout(ctx);
    }

    /// Recomputes positions after a resize or a label change.
    pub fn layout(&self, ctx: &mut Context<'_>) {
        let (width, height) = ctx.canvas.size();

        ctx.canvas
            .set_position(self.layers.background, [Pt::ZERO; 2]);
        ctx.canvas.set_size(self.layers.background, [width, height]);

        let [label_w, label_h] = self.layers.label.texture.size();
        let label_pos = [
            (width - label_w) / 2.0,
            bottom_anchored(height, self.config.label_anchor, label_h),
        ];
        ctx.canvas
            .set_position(self.layers.label.primitive, label_pos);
        // Shadows sit up-right of the label, farthest first.
        let layers = self.layers.shadows.len();
        for (i, id) in self.layers.shadows.iter().enumerate() {
            let offset = Pt::from((layers - i) as f32);
            ctx.canvas
                .set_position(*id, [label_pos[0] + offset, label_pos[1] - offset]);
        }

        let [timer_w, timer_h] = self.layers.stopwatch.texture.size();
        ctx.canvas.set_position(
            self.layers.stopwatch.primitive,
            [
                width / 2.0 - timer_w / 2.0,
                bottom_anchored(height, self.config.stopwatch_anchor, timer_h),
            ],
        );
    }

    fn start_session(&mut self, ctx: &mut Context<'_>, now: Instant) {
        if !self.stopwatch.start(now) {
            return;
        }
        tracing::info!("session started");
        self.recurring.push(ctx.timers.schedule_interval(
            Task::StopwatchTick,
            now,
            self.config.stopwatch_period,
        ));
        self.recurring.push(ctx.timers.schedule_interval(
            Task::PeriodicFlash,
            now,
            self.config.flash_period,
        ));
    }

    fn spawn_circle(&mut self, ctx: &mut Context<'_>, at: [Pt; 2], now: Instant) {
        let radius = self.config.circle_radius;
        let size = radius * 2.0;
        let position = [at[0] - radius, at[1] - radius];
        let primitive = ctx
            .canvas
            .add_ellipse(self.base_color.negative(), position, [size; 2]);
        self.circles.push(Circle {
            primitive,
            position,
            size,
            created_at: now,
            grown: false,
        });
    }

    fn flash(&mut self, ctx: &mut Context<'_>, color: Rgba, duration: Duration, now: Instant) {
        self.show_background(ctx, color);
        ctx.timers.schedule_once(Task::FlashRevert, now, duration);
    }

    /// Restores whatever the base color is when the revert fires.
    fn revert_flash(&mut self, ctx: &mut Context<'_>) {
        self.show_background(ctx, self.base_color);
    }

    fn show_background(&mut self, ctx: &mut Context<'_>, color: Rgba) {
        self.background_color = color;
        ctx.canvas.set_color(self.layers.background, color);
    }
}

/// Top edge of an item whose bottom edge sits `fraction` of `height` above the bottom.
fn bottom_anchored(height: Pt, fraction: f32, item_height: Pt) -> Pt {
    height - height * fraction - item_height
}
