//! The record kind table.
//!
//! Every record carries an `i32` type tag. Known tags map to a named
//! [`FragKind`] variant; anything else is kept as [`FragKind::Unknown`] so
//! the raw layer can carry it through untouched. Adding a kind means adding
//! one row to the table below.

use std::fmt;

macro_rules! frag_kinds {
    ($( $(#[$doc:meta])* $variant:ident = $code:literal, $name:literal, $suffix:literal, $named:literal; )*) => {
        /// A record type tag.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FragKind {
            $( $(#[$doc])* $variant, )*
            /// A tag outside the known table.
            Unknown(i32),
        }

        impl FragKind {
            /// Every known kind, in tag order.
            pub const KNOWN: &'static [FragKind] = &[$(FragKind::$variant,)*];

            /// Look up the kind for a raw type tag.
            pub fn from_code(code: i32) -> Self {
                match code {
                    $( $code => Self::$variant, )*
                    other => Self::Unknown(other),
                }
            }

            /// The raw type tag.
            pub fn code(self) -> i32 {
                match self {
                    $( Self::$variant => $code, )*
                    Self::Unknown(code) => code,
                }
            }

            /// Human-readable kind name, used in errors and logs.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                    Self::Unknown(_) => "Unknown",
                }
            }

            /// Suffix appended to the record index when a placeholder tag
            /// has to be synthesized for an unnamed record.
            pub fn placeholder_suffix(self) -> &'static str {
                match self {
                    $( Self::$variant => $suffix, )*
                    Self::Unknown(_) => "UNKNOWN",
                }
            }

            /// Whether the payload starts with an `i32` self-name reference.
            pub fn has_name(self) -> bool {
                match self {
                    $( Self::$variant => $named, )*
                    Self::Unknown(_) => false,
                }
            }
        }
    };
}

frag_kinds! {
    /// Hashed path of the default palette bitmap.
    DefaultPaletteFile = 0x01, "DefaultPaletteFile", "PALETTEFILE", false;
    /// Free-form hashed user data string.
    UserData = 0x02, "UserData", "USERDATA", false;
    /// Bitmap file name list.
    BmInfo = 0x03, "BMInfo", "BMINFO", true;
    /// Animated sprite frames built from bitmaps.
    SimpleSpriteDef = 0x04, "SimpleSpriteDef", "SPRITEDEF", true;
    /// Instance of a simple sprite definition.
    SimpleSprite = 0x05, "SimpleSprite", "SPRITEINST", true;
    /// 2D sprite definition.
    Sprite2DDef = 0x06, "Sprite2DDef", "SPRITE2DDEF", true;
    /// Instance of a 2D sprite definition.
    Sprite2D = 0x07, "Sprite2D", "SPRITE2D", true;
    /// 3D sprite definition.
    Sprite3DDef = 0x08, "Sprite3DDef", "SPRITE3DDEF", true;
    /// Instance of a 3D sprite definition.
    Sprite3D = 0x09, "Sprite3D", "SPRITE3D", true;
    /// 4D sprite definition.
    Sprite4DDef = 0x0A, "Sprite4DDef", "SPRITE4DDEF", true;
    /// Instance of a 4D sprite definition.
    Sprite4D = 0x0B, "Sprite4D", "SPRITE4D", true;
    /// Particle sprite definition.
    ParticleSpriteDef = 0x0C, "ParticleSpriteDef", "PARTICLEDEF", true;
    /// Instance of a particle sprite definition.
    ParticleSprite = 0x0D, "ParticleSprite", "PARTICLE", true;
    /// Composite sprite definition.
    CompositeSpriteDef = 0x0E, "CompositeSpriteDef", "COMPOSITEDEF", true;
    /// Instance of a composite sprite definition.
    CompositeSprite = 0x0F, "CompositeSprite", "COMPOSITE", true;
    /// Skeleton: bone tree plus attached skins.
    HierarchicalSpriteDef = 0x10, "HierarchicalSpriteDef", "HS_DEF", true;
    /// Instance of a skeleton definition.
    HierarchicalSprite = 0x11, "HierarchicalSprite", "HS", true;
    /// Bone transform keyframes.
    TrackDef = 0x12, "TrackDef", "TRACKDEF", true;
    /// Playback of a track definition.
    Track = 0x13, "Track", "TRACK", true;
    /// Actor definition with LOD actions.
    ActorDef = 0x14, "ActorDef", "ACTORDEF", true;
    /// Placed actor.
    Actor = 0x15, "Actor", "ACTOR", true;
    /// Bounding sphere.
    Sphere = 0x16, "Sphere", "SPHERE", true;
    /// Convex collision volume.
    PolyhedronDef = 0x17, "PolyhedronDef", "POLYHDEF", true;
    /// Instance of a collision volume.
    Polyhedron = 0x18, "Polyhedron", "POLYH", true;
    /// Sphere list definition.
    SphereListDef = 0x19, "SphereListDef", "SPHERELISTDEF", true;
    /// Instance of a sphere list definition.
    SphereList = 0x1A, "SphereList", "SPHERELIST", true;
    /// Light levels and colors.
    LightDef = 0x1B, "LightDef", "LDEF", true;
    /// Instance of a light definition.
    Light = 0x1C, "Light", "L", true;
    /// Older point light layout.
    PointLightOld = 0x1D, "PointLightOld", "POINTLIGHTOLD", true;
    /// Sound definition.
    SoundDef = 0x1F, "SoundDef", "SOUNDDEF", true;
    /// Sound instance.
    Sound = 0x20, "Sound", "SOUND", true;
    /// BSP tree over the zone's regions.
    WorldTree = 0x21, "WorldTree", "WORLDTREE", true;
    /// One BSP leaf region.
    Region = 0x22, "Region", "REGION", true;
    /// Active geometry region.
    ActiveGeoRegion = 0x23, "ActiveGeoRegion", "ACTIVEGEOREGION", true;
    /// Sky region.
    SkyRegion = 0x24, "SkyRegion", "SKYREGION", true;
    /// Older directional light layout.
    DirectionalLightOld = 0x25, "DirectionalLightOld", "DIRLIGHTOLD", true;
    /// Blit sprite definition.
    BlitSpriteDef = 0x26, "BlitSpriteDef", "BLITSPRITEDEF", true;
    /// Instance of a blit sprite definition.
    BlitSprite = 0x27, "BlitSprite", "BLITSPRITE", true;
    /// Placed point light.
    PointLight = 0x28, "PointLight", "POINTLIGHT", true;
    /// Named group of regions.
    Zone = 0x29, "Zone", "ZONE", true;
    /// Ambient light applied to regions.
    AmbientLight = 0x2A, "AmbientLight", "AMBIENTLIGHT", true;
    /// Directional light applied to regions.
    DirectionalLight = 0x2B, "DirectionalLight", "DIRECTIONALLIGHT", true;
    /// First-generation mesh definition.
    DmSpriteDef = 0x2C, "DMSpriteDef", "DMSPRITEDEF", true;
    /// Instance of a mesh, skeleton, or sprite definition.
    DmSprite = 0x2D, "DMSprite", "DMSPRITE", true;
    /// Mesh vertex animation definition.
    DmTrackDef = 0x2E, "DMTrackDef", "DMTRACKDEF", true;
    /// Instance of a mesh vertex animation.
    DmTrack = 0x2F, "DMTrack", "DMTRACK", true;
    /// Material definition.
    MaterialDef = 0x30, "MaterialDef", "MDF", true;
    /// Ordered list of materials.
    MaterialPalette = 0x31, "MaterialPalette", "MPL", true;
    /// Baked per-vertex colors over time.
    DmRgbTrackDef = 0x32, "DmRGBTrackDef", "DMT", true;
    /// Instance of a baked-color track.
    DmRgbTrack = 0x33, "DmRGBTrack", "DMTI", true;
    /// Particle cloud definition.
    ParticleCloudDef = 0x34, "ParticleCloudDef", "PCD", true;
    /// The world's global ambient light.
    GlobalAmbientLightDef = 0x35, "GlobalAmbientLightDef", "GLOBALAMBIENT_LIGHTDEF", true;
    /// Second-generation mesh definition.
    DmSpriteDef2 = 0x36, "DmSpriteDef2", "DMSPRITEDEF2", true;
    /// Second-generation mesh vertex animation.
    DmTrackDef2 = 0x37, "DmTrackDef2", "DMTRACKDEF2", true;
}

impl fmt::Display for FragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}

impl From<i32> for FragKind {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}
