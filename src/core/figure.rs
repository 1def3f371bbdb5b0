/// Figure builder: assembles the avatar scene tree from appearance settings.
///
/// The builder is a pure function of the settings (floral texture draws
/// aside) and always produces a fresh tree. Alongside the tree it returns a
/// [`FigureParts`] handle bundle so animation never has to search by name.
use glam::Vec2;
use rand::Rng;
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;
use thiserror::Error;

use crate::core::scene::{Material, Node, NodePath, Primitive};
use crate::core::texture::{generate_texture_with_rng, Texture, TextureError};
use crate::schema::appearance::{
    AccessoryType, AppearanceSettings, EarringStyle, GlassesStyle, HairStyle, HatStyle,
    OutfitStyle,
};
use crate::schema::palette::{Color, DUSTY_ROSE, SILVER};

/// UV repeat applied to outfit textures on capsules.
const OUTFIT_TILING: Vec2 = Vec2::new(2.0, 4.0);

/// Resting height of the eyebrows above the head centre.
pub const BROW_REST_Y: f32 = 0.22;

/// Resting z-rotation of mouth and brows: laid horizontally.
pub const FEATURE_REST_ROLL: f32 = FRAC_PI_2;

/// Resting x-rotation of the elbows once a wave settles.
pub const ELBOW_SETTLE_X: f32 = -0.28;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("texture generation failed: {0}")]
    Texture(#[from] TextureError),
}

/// Handles to the parts the animation engine drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureParts {
    pub body: NodePath,
    pub head: NodePath,
    pub mouth: NodePath,
    pub brow_l: NodePath,
    pub brow_r: NodePath,
    pub eye_l: NodePath,
    pub eye_r: NodePath,
    pub left_shoulder: NodePath,
    pub right_shoulder: NodePath,
    pub left_elbow: NodePath,
    pub right_elbow: NodePath,
}

/// A built avatar: the scene tree plus handles into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub root: Node,
    pub parts: FigureParts,
}

impl Figure {
    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        self.root.get(path)
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        self.root.get_mut(path)
    }

    /// The outfit texture the body is dressed in.
    pub fn outfit_texture(&self) -> Option<&Arc<Texture>> {
        self.node(&self.parts.body)?.material.as_ref()?.texture_ref()
    }
}

impl OutfitStyle {
    fn fabric_roughness(&self) -> f32 {
        match self {
            Self::Cardigan => 0.85,
            Self::Dress => 0.6,
            Self::Blouse => 0.5,
        }
    }
}

/// Build the figure, drawing floral randomness from the thread RNG.
pub fn build(settings: &AppearanceSettings) -> Result<Figure, BuildError> {
    build_with_rng(settings, &mut rand::thread_rng())
}

/// Build the figure, drawing floral randomness from `rng`.
pub fn build_with_rng<R: Rng + ?Sized>(
    settings: &AppearanceSettings,
    rng: &mut R,
) -> Result<Figure, BuildError> {
    let outfit = Arc::new(generate_texture_with_rng(
        settings.outfit_pattern,
        settings.outfit_color.color(),
        rng,
    )?);

    let mut root = Node::pivot("avatar");

    let mut body = Node::shape(
        Primitive::Capsule { cap_radius: 0.52, height: 1.8 },
        Material::texture(outfit.clone(), OUTFIT_TILING)
            .rough(settings.outfit_style.fabric_roughness()),
    )
    .named("body");

    let mut head = Node::shape(
        Primitive::Sphere { radius: 0.48 },
        Material::color(settings.skin_tone.color())
            .rough(0.5 + 0.4 * settings.wrinkle_intensity.get()),
    )
    .named("head")
    .at(0.0, 1.35, 0.0);

    // Hats go on after hair: they sit over it, both stay in the tree
    let face = build_face(&mut head, settings);
    build_ears(&mut head, settings);
    build_hair(&mut head, settings);
    build_hats(&mut head, settings);
    build_glasses(&mut head, settings);

    let head_idx = body.add_child(head);
    let arms = build_arms(&mut body, settings, &outfit);
    build_accessory(&mut body, settings);

    let body_path = NodePath::root().child(root.add_child(body));
    let head_path = body_path.child(head_idx);

    let parts = FigureParts {
        mouth: head_path.child(face.mouth),
        brow_l: head_path.child(face.brow_l),
        brow_r: head_path.child(face.brow_r),
        eye_l: head_path.child(face.eye_l),
        eye_r: head_path.child(face.eye_r),
        left_shoulder: body_path.child(arms.left.shoulder),
        right_shoulder: body_path.child(arms.right.shoulder),
        left_elbow: body_path
            .child(arms.left.shoulder)
            .child(arms.left.upper_arm)
            .child(arms.left.elbow),
        right_elbow: body_path
            .child(arms.right.shoulder)
            .child(arms.right.upper_arm)
            .child(arms.right.elbow),
        head: head_path,
        body: body_path,
    };

    Ok(Figure { root, parts })
}

fn hair_color(settings: &AppearanceSettings) -> Color {
    settings
        .hair_color
        .color()
        .lerp(SILVER, settings.grey_intensity.get())
}

/// Iterate mirrored sides: (sign, suffix), left first.
fn sides() -> [(f32, &'static str); 2] {
    [(-1.0, "L"), (1.0, "R")]
}

struct FaceIndices {
    eye_l: usize,
    eye_r: usize,
    brow_l: usize,
    brow_r: usize,
    mouth: usize,
}

fn build_face(head: &mut Node, settings: &AppearanceSettings) -> FaceIndices {
    let skin = settings.skin_tone.color();
    let brow_color = hair_color(settings);
    let brow_radius = 0.012 + 0.016 * settings.brow_thickness.get();

    let mut eyes = [0usize; 2];
    let mut brows = [0usize; 2];

    for (i, (s, side)) in sides().into_iter().enumerate() {
        let x = s * 0.16;

        let mut socket = Node::shape(Primitive::Sphere { radius: 0.10 }, Material::color(Color::WHITE))
            .named(format!("eye_{side}"))
            .at(x, 0.08, 0.38);
        let mut iris = Node::shape(
            Primitive::Sphere { radius: 0.058 },
            Material::color(settings.eye_color.color()),
        )
        .named(format!("iris_{side}"))
        .at(0.0, 0.0, 0.06);
        iris.add_child(
            Node::shape(Primitive::Sphere { radius: 0.028 }, Material::color(Color::BLACK))
                .named(format!("pupil_{side}"))
                .at(0.0, 0.0, 0.04),
        );
        socket.add_child(iris);
        if settings.has_lashes {
            socket.add_child(
                Node::shape(
                    Primitive::Capsule { cap_radius: 0.008, height: 0.16 },
                    Material::color(Color::white(0.15)),
                )
                .named(format!("lash_{side}"))
                .at(0.0, 0.085, 0.05)
                .rotated(0.0, 0.0, FEATURE_REST_ROLL),
            );
        }
        eyes[i] = head.add_child(socket);

        brows[i] = head.add_child(
            Node::shape(
                Primitive::Capsule { cap_radius: brow_radius, height: 0.14 },
                Material::color(brow_color),
            )
            .named(format!("brow_{side}"))
            .at(x, BROW_REST_Y, 0.45)
            .rotated(0.0, 0.0, FEATURE_REST_ROLL),
        );
    }

    head.add_child(
        Node::shape(Primitive::Sphere { radius: 0.065 }, Material::color(skin))
            .named("nose")
            .at(0.0, -0.02, 0.44),
    );

    let mouth = head.add_child(
        Node::shape(
            Primitive::Capsule { cap_radius: 0.032, height: 0.20 },
            Material::color(DUSTY_ROSE),
        )
        .named("mouth")
        .at(0.0, -0.15, 0.40)
        .rotated(0.0, 0.0, FEATURE_REST_ROLL),
    );

    FaceIndices {
        eye_l: eyes[0],
        eye_r: eyes[1],
        brow_l: brows[0],
        brow_r: brows[1],
        mouth,
    }
}

fn earring(style: EarringStyle) -> Option<Node> {
    match style {
        EarringStyle::Pearl => Some(
            Node::shape(
                Primitive::Sphere { radius: 0.035 },
                Material::color(Color::WHITE).rough(0.2).metal(0.1),
            )
            .at(0.0, -0.1, 0.0),
        ),
        EarringStyle::GoldHoop => Some(
            Node::shape(
                Primitive::Torus { ring_radius: 0.04, pipe_radius: 0.008 },
                Material::color(Color::rgb(1.0, 0.8, 0.2)).rough(0.2).metal(1.0),
            )
            .at(0.0, -0.12, 0.0)
            .rotated(FRAC_PI_2, 0.0, 0.0),
        ),
        EarringStyle::Diamond => Some(
            Node::shape(
                Primitive::Pyramid { width: 0.04, height: 0.04, length: 0.04 },
                Material::color(Color::white(0.95)).rough(0.1).metal(0.8),
            )
            .at(0.0, -0.08, 0.06)
            .rotated(FRAC_PI_2, 0.0, 0.0),
        ),
        EarringStyle::None => None,
    }
}

fn build_ears(head: &mut Node, settings: &AppearanceSettings) {
    let skin = settings.skin_tone.color();
    for (s, side) in sides() {
        let mut ear = Node::shape(Primitive::Sphere { radius: 0.09 }, Material::color(skin))
            .named(format!("ear_{side}"))
            .at(s * 0.44, 0.05, 0.02)
            .scaled(0.6, 0.9, 0.5);
        if let Some(ring) = earring(settings.earring_style) {
            ear.add_child(ring.named(format!("earring_{side}")));
        }
        head.add_child(ear);
    }
}

fn build_hair(head: &mut Node, settings: &AppearanceSettings) {
    let hair = Material::color(hair_color(settings)).rough(0.7);

    head.add_child(
        Node::shape(Primitive::Sphere { radius: 0.49 }, hair.clone())
            .named("hair_cap")
            .at(0.0, 0.1, -0.05)
            .scaled(1.0, 0.8, 0.9),
    );

    match settings.hair_style {
        HairStyle::Bun => {
            head.add_child(
                Node::shape(Primitive::Sphere { radius: 0.25 }, hair)
                    .named("hair_bun")
                    .at(0.0, 0.35, -0.4),
            );
        }
        HairStyle::Bob => {
            for (s, side) in sides() {
                head.add_child(
                    Node::shape(
                        Primitive::Capsule { cap_radius: 0.15, height: 0.6 },
                        hair.clone(),
                    )
                    .named(format!("hair_side_{side}"))
                    .at(s * 0.4, -0.1, 0.1),
                );
            }
        }
        HairStyle::Long => {
            head.add_child(
                Node::shape(Primitive::Cylinder { radius: 0.45, height: 0.8 }, hair)
                    .named("hair_long")
                    .at(0.0, -0.3, -0.2),
            );
        }
        HairStyle::Pixie => {
            head.add_child(
                Node::shape(Primitive::Sphere { radius: 0.1 }, hair)
                    .named("hair_spike")
                    .at(0.0, 0.5, 0.0),
            );
        }
    }
}

fn build_hats(head: &mut Node, settings: &AppearanceSettings) {
    match settings.hat_style {
        HatStyle::SunHat => {
            let straw = Material::color(Color::rgb(0.9, 0.8, 0.6));
            head.add_child(
                Node::shape(Primitive::Cylinder { radius: 0.75, height: 0.02 }, straw.clone())
                    .named("hat_brim")
                    .at(0.0, 0.4, -0.05)
                    .rotated(-0.1, 0.0, 0.0),
            );
            head.add_child(
                Node::shape(Primitive::Cylinder { radius: 0.45, height: 0.3 }, straw)
                    .named("hat_crown")
                    .at(0.0, 0.55, -0.05)
                    .rotated(-0.1, 0.0, 0.0),
            );
        }
        HatStyle::Beanie => {
            let mut beanie = Node::shape(
                Primitive::Sphere { radius: 0.52 },
                Material::color(Color::rgb(0.2, 0.4, 0.6)).rough(0.9),
            )
            .named("beanie")
            .at(0.0, 0.15, -0.05);
            beanie.add_child(
                Node::shape(
                    Primitive::Sphere { radius: 0.15 },
                    Material::color(Color::WHITE).rough(0.9),
                )
                .named("pompom")
                .at(0.0, 0.55, 0.0),
            );
            head.add_child(beanie);
        }
        HatStyle::Beret => {
            let felt = Material::color(Color::rgb(0.8, 0.2, 0.2)).rough(0.9);
            let mut beret = Node::shape(Primitive::Cylinder { radius: 0.5, height: 0.15 }, felt.clone())
                .named("beret")
                .at(0.1, 0.45, 0.0)
                .rotated(-0.2, 0.0, -0.2);
            beret.add_child(
                Node::shape(Primitive::Cylinder { radius: 0.02, height: 0.05 }, felt)
                    .named("beret_tip")
                    .at(0.0, 0.1, 0.0),
            );
            head.add_child(beret);
        }
        HatStyle::None => {}
    }
}

fn build_glasses(head: &mut Node, settings: &AppearanceSettings) {
    let style = settings.glasses_style;
    if style == GlassesStyle::None {
        return;
    }
    let frame = Material::color(Color::BLACK).rough(0.3);

    for (s, side) in sides() {
        let lens = match style {
            GlassesStyle::Square => Node::shape(
                Primitive::Box { width: 0.25, height: 0.18, length: 0.02, chamfer: 0.01 },
                frame.clone(),
            ),
            _ => {
                let ring_radius = if style == GlassesStyle::Round { 0.115 } else { 0.10 };
                Node::shape(
                    Primitive::Torus { ring_radius, pipe_radius: 0.013 },
                    frame.clone(),
                )
                .rotated(FRAC_PI_2, 0.0, 0.0)
            }
        };
        head.add_child(
            lens.named(format!("glasses_{side}"))
                .at(s * 0.16, 0.08, 0.41),
        );
    }

    head.add_child(
        Node::shape(Primitive::Cylinder { radius: 0.01, height: 0.10 }, frame)
            .named("glasses_bridge")
            .at(0.0, 0.08, 0.46)
            .rotated(0.0, 0.0, FRAC_PI_2),
    );
}

struct ArmIndices {
    shoulder: usize,
    upper_arm: usize,
    elbow: usize,
}

struct ArmPair {
    left: ArmIndices,
    right: ArmIndices,
}

fn build_arms(body: &mut Node, settings: &AppearanceSettings, outfit: &Arc<Texture>) -> ArmPair {
    let skin = settings.skin_tone.color();

    let mut build_one = |s: f32, prefix: &str, side: &str| {
        let mut shoulder = Node::pivot(&format!("{prefix}Sh")).at(s * 0.70, 0.52, 0.0);

        let mut upper = Node::shape(
            Primitive::Capsule { cap_radius: 0.09, height: 0.50 },
            Material::texture(outfit.clone(), OUTFIT_TILING),
        )
        .named(format!("upperArm_{side}"))
        .at(0.0, -0.23, 0.0)
        .rotated(0.0, 0.0, s * 0.22);

        let mut elbow = Node::pivot(&format!("{prefix}El")).at(0.0, -0.28, 0.0);

        let mut forearm = Node::shape(
            Primitive::Capsule { cap_radius: 0.07, height: 0.38 },
            Material::color(skin),
        )
        .named(format!("forearm_{side}"))
        .at(0.0, -0.19, 0.0);
        forearm.add_child(
            Node::shape(Primitive::Sphere { radius: 0.07 }, Material::color(skin))
                .named(format!("hand_{side}"))
                .at(0.0, -0.21, 0.0),
        );

        elbow.add_child(forearm);
        let elbow_idx = upper.add_child(elbow);
        let upper_idx = shoulder.add_child(upper);
        ArmIndices {
            shoulder: body.add_child(shoulder),
            upper_arm: upper_idx,
            elbow: elbow_idx,
        }
    };

    let left = build_one(-1.0, "left", "L");
    let right = build_one(1.0, "right", "R");
    ArmPair { left, right }
}

fn build_accessory(body: &mut Node, settings: &AppearanceSettings) {
    match settings.accessory {
        AccessoryType::Pearl => {
            body.add_child(
                Node::shape(
                    Primitive::Torus { ring_radius: 0.28, pipe_radius: 0.008 },
                    Material::color(Color::white(0.9)),
                )
                .named("necklace")
                .at(0.0, 0.95, 0.05),
            );
        }
        AccessoryType::Gold => {
            body.add_child(
                Node::shape(
                    Primitive::Torus { ring_radius: 0.28, pipe_radius: 0.005 },
                    Material::color(Color::YELLOW).metal(1.0),
                )
                .named("necklace")
                .at(0.0, 0.95, 0.05),
            );
        }
        AccessoryType::Scarf => {
            let silk = Material::color(Color::RED);
            body.add_child(
                Node::shape(
                    Primitive::Torus { ring_radius: 0.30, pipe_radius: 0.08 },
                    silk.clone(),
                )
                .named("scarf")
                .at(0.0, 0.92, 0.05),
            );
            body.add_child(
                Node::shape(Primitive::Capsule { cap_radius: 0.08, height: 0.4 }, silk)
                    .named("scarf_tail")
                    .at(0.1, 0.7, 0.25)
                    .rotated(0.5, 0.0, 0.0),
            );
        }
        AccessoryType::Brooch => {
            body.add_child(
                Node::shape(Primitive::Sphere { radius: 0.04 }, Material::color(Color::RED))
                    .named("brooch")
                    .at(-0.2, 0.7, 0.45),
            );
        }
        AccessoryType::None => {}
    }
}
