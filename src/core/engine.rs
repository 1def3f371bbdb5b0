/// The avatar engine: owns the built figure and drives its animation.
///
/// Wires together the figure builder, the action machine, the expression
/// engine, lip-sync and blinking over a virtual clock advanced by
/// [`AvatarEngine::tick`].
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::action::ActionMachine;
use crate::core::blink::BlinkScheduler;
use crate::core::config::{AvatarConfig, ConfigError};
use crate::core::expression;
use crate::core::figure::{self, BuildError, Figure, FigureParts};
use crate::core::lipsync::LipSync;
use crate::core::motion::Animator;
use crate::core::scene::{Camera, Light, LightKind, Node};
use crate::core::timer::{Fired, TimerKind, Timers};
use crate::schema::appearance::{AppearanceSettings, BackgroundTheme, CameraFilter};
use crate::schema::palette::Color;
use crate::schema::state::{Action, Expression};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("build error: {0}")]
    Build(#[from] BuildError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Mutable view of the engine state the schedulers animate through.
pub struct Rig<'a> {
    pub figure: Option<&'a mut Figure>,
    pub timers: &'a mut Timers,
    pub animator: &'a mut Animator,
    pub config: &'a AvatarConfig,
    pub rng: &'a mut StdRng,
}

impl Rig<'_> {
    /// Handles into the current figure, if one is built.
    pub fn parts(&self) -> Option<FigureParts> {
        self.figure.as_ref().map(|f| f.parts.clone())
    }
}

/// Lights, camera and backdrop around the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub lights: Vec<Node>,
    pub camera: Node,
    pub background: BackgroundTheme,
    pub filter: CameraFilter,
}

impl Stage {
    pub fn new(settings: &AppearanceSettings) -> Self {
        Self {
            lights: vec![
                Node::pivot("ambientLight").with_light(Light {
                    kind: LightKind::Ambient,
                    intensity: 300.0,
                }),
                Node::pivot("omniLight").at(2.0, 2.0, 5.0).with_light(Light {
                    kind: LightKind::Omni,
                    intensity: 800.0,
                }),
            ],
            camera: Node::pivot("camera")
                .at(0.0, 1.3, 3.5)
                .with_camera(Camera::default()),
            background: settings.background_theme,
            filter: settings.camera_filter,
        }
    }

    /// Backdrop gradient stops with the camera filter applied.
    pub fn backdrop(&self) -> (Color, Color) {
        let (top, bottom) = self.background.backdrop();
        (self.filter.grade(top), self.filter.grade(bottom))
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.transform.position
    }
}

#[derive(Debug, Clone, Default)]
struct Schedulers {
    actions: ActionMachine,
    blink: BlinkScheduler,
    lip_sync: LipSync,
}

/// The avatar engine. Built via `AvatarEngine::builder()`.
pub struct AvatarEngine {
    settings: AppearanceSettings,
    config: AvatarConfig,
    figure: Option<Figure>,
    stage: Stage,
    timers: Timers,
    animator: Animator,
    schedulers: Schedulers,
    expression: Expression,
    speaking: bool,
    rng: StdRng,
}

/// Builder for constructing an `AvatarEngine`.
pub struct AvatarEngineBuilder {
    settings: AppearanceSettings,
    config: Option<AvatarConfig>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
}

impl AvatarEngine {
    pub fn builder() -> AvatarEngineBuilder {
        AvatarEngineBuilder {
            settings: AppearanceSettings::default(),
            config: None,
            config_path: None,
            seed: None,
        }
    }

    pub fn settings(&self) -> &AppearanceSettings {
        &self.settings
    }

    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn action(&self) -> Action {
        self.schedulers.actions.current()
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Virtual time in seconds since the engine was built.
    pub fn now(&self) -> f64 {
        self.timers.now()
    }

    pub fn gesture_active(&self) -> bool {
        self.schedulers.actions.gesture_active(&self.timers)
    }

    pub fn blink_pending(&self) -> bool {
        self.schedulers.blink.is_pending(&self.timers)
    }

    pub fn lip_sync_active(&self) -> bool {
        self.schedulers.lip_sync.is_active(&self.timers)
    }

    fn split(&mut self) -> (Rig<'_>, &mut Schedulers) {
        (
            Rig {
                figure: self.figure.as_mut(),
                timers: &mut self.timers,
                animator: &mut self.animator,
                config: &self.config,
                rng: &mut self.rng,
            },
            &mut self.schedulers,
        )
    }

    pub fn apply_action(&mut self, action: Action) {
        let (mut rig, s) = self.split();
        s.actions.apply(action, &mut rig, &mut s.blink);
    }

    pub fn apply_expression(&mut self, expression: Expression) {
        if expression != self.expression {
            debug!(from = ?self.expression, to = ?expression, "expression change");
        }
        self.expression = expression;
        if let Some(figure) = self.figure.as_mut() {
            expression::apply_expression(figure, expression);
        }
    }

    pub fn apply_lip_sync(&mut self, speaking: bool) {
        self.speaking = speaking;
        let expression = self.expression;
        let (mut rig, s) = self.split();
        s.lip_sync.apply(speaking, expression, &mut rig);
    }

    /// Rebuild the figure for `settings` and re-apply the animation state.
    ///
    /// The new figure is built off to the side; on failure the current
    /// figure and settings stay in place.
    pub fn update_settings(&mut self, settings: AppearanceSettings) -> Result<(), EngineError> {
        self.update_settings_with(settings, figure::build_with_rng)
    }

    pub(crate) fn update_settings_with<F>(
        &mut self,
        settings: AppearanceSettings,
        build: F,
    ) -> Result<(), EngineError>
    where
        F: FnOnce(&AppearanceSettings, &mut StdRng) -> Result<Figure, BuildError>,
    {
        let figure = match build(&settings, &mut self.rng) {
            Ok(figure) => figure,
            Err(e) => {
                warn!(error = %e, "rebuild failed, keeping previous figure");
                return Err(e.into());
            }
        };
        if settings.facial_expression != self.settings.facial_expression {
            self.expression = settings.facial_expression.baseline();
        }
        self.settings = settings;
        self.install(figure);
        Ok(())
    }

    fn install(&mut self, figure: Figure) {
        debug!(nodes = figure.root.len(), "figure rebuilt");
        self.figure = Some(figure);
        // Motions point into the old tree
        self.animator.clear();
        self.refresh();
    }

    /// Re-apply action, expression and lip-sync, then re-create the stage.
    pub fn refresh(&mut self) {
        self.apply_action(self.action());
        self.apply_expression(self.expression);
        self.apply_lip_sync(self.speaking);
        self.stage = Stage::new(&self.settings);
    }

    /// Advance virtual time by `dt` seconds.
    ///
    /// Due timers fire in chronological order, with motions advanced up to
    /// each firing first so they pick up from the right pose. A non-finite
    /// `dt` is ignored.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() {
            warn!(dt, "ignoring non-finite tick");
            return;
        }
        let target = self.timers.now() + f64::from(dt.max(0.0));
        let mut clock = self.timers.now();
        while let Some(fired) = self.timers.pop_due(target) {
            self.advance_motions((fired.at - clock) as f32);
            clock = fired.at;
            self.dispatch(fired);
        }
        self.advance_motions((target - clock) as f32);
        self.timers.settle(target);
    }

    fn advance_motions(&mut self, dt: f32) {
        match self.figure.as_mut() {
            Some(figure) => self.animator.advance(dt, &mut figure.root),
            None => self.animator.clear(),
        }
    }

    fn dispatch(&mut self, fired: Fired) {
        let (mut rig, s) = self.split();
        let handled = match fired.kind {
            TimerKind::Gesture => s.actions.on_timer(fired.id, &mut rig),
            TimerKind::LipSync => s.lip_sync.on_timer(fired.id, &mut rig),
            TimerKind::Blink => s.blink.on_timer(fired.id, &mut rig),
        };
        if !handled {
            debug!(kind = ?fired.kind, "dropping orphaned timer");
            self.timers.cancel(fired.id);
        }
    }
}

impl AvatarEngineBuilder {
    pub fn settings(mut self, settings: AppearanceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn config(mut self, config: AvatarConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from a RON file at build time. Ignored when a config
    /// is given directly.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Seed the engine RNG; overrides any seed in the config.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<AvatarEngine, EngineError> {
        let config = match (self.config, &self.config_path) {
            (Some(config), _) => {
                config.validate()?;
                config
            }
            (None, Some(path)) => AvatarConfig::load_from_ron(path)?,
            (None, None) => AvatarConfig::default(),
        };

        let mut rng = match self.seed.or(config.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let figure = figure::build_with_rng(&self.settings, &mut rng)?;

        let mut engine = AvatarEngine {
            expression: self.settings.facial_expression.baseline(),
            stage: Stage::new(&self.settings),
            settings: self.settings,
            config,
            figure: None,
            timers: Timers::new(),
            animator: Animator::new(),
            schedulers: Schedulers::default(),
            speaking: false,
            rng,
        };
        engine.install(figure);
        Ok(engine)
    }
}
