//! Actor definitions and placed actors.

use wld_core::{NameRef, RecordRef};

use super::{bit_if, gated, Payload};
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// Position and orientation of an actor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    /// World position.
    pub position: [f32; 3],
    /// Rotation about each axis.
    pub rotation: [f32; 3],
    /// Trailing word, uninterpreted.
    pub unk: u32,
}

impl Location {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            position: r.vec3()?,
            rotation: r.vec3()?,
            unk: r.u32()?,
        })
    }

    fn encode(&self, w: &mut FragWriter) {
        w.vec3(self.position);
        w.vec3(self.rotation);
        w.u32(self.unk);
    }
}

/// One action of an actor definition: a set of LOD switch distances.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Action {
    /// Uninterpreted word stored after the LOD count.
    pub unk: u32,
    /// Minimum view distance per LOD, nearest first.
    pub lods: Vec<f32>,
}

/// 0x14: actor definition.
///
/// Sprite references are stored flat after all actions; the `n`th sprite
/// belongs to the `n`th LOD across all actions in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than the field-presence bits.
    pub flags: u32,
    /// Name of the behavior callback.
    pub callback: NameRef,
    /// Bounds reference, uninterpreted.
    pub bounds_ref: u32,
    /// Action to start in.
    pub current_action: Option<u32>,
    /// Default placement.
    pub location: Option<Location>,
    /// Actions with their LOD distances.
    pub actions: Vec<Action>,
    /// One mesh, skeleton or sprite instance per LOD.
    pub sprites: Vec<RecordRef>,
    /// Trailing word, uninterpreted.
    pub unk: u32,
}

impl ActorDef {
    /// Flag bit gating [`ActorDef::current_action`].
    pub const HAS_CURRENT_ACTION: u32 = 0x01;
    /// Flag bit gating [`ActorDef::location`].
    pub const HAS_LOCATION: u32 = 0x02;
    const DERIVED: u32 = Self::HAS_CURRENT_ACTION | Self::HAS_LOCATION;

    /// Total LOD count across all actions.
    pub fn lod_count(&self) -> usize {
        self.actions.iter().map(|a| a.lods.len()).sum()
    }
}

impl Payload for ActorDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let callback = r.name()?;
        let action_count = r.u32()? as usize;
        let sprite_count = r.u32()? as usize;
        let bounds_ref = r.u32()?;
        let current_action = gated(flags, Self::HAS_CURRENT_ACTION, || r.u32())?;
        let location = gated(flags, Self::HAS_LOCATION, || Location::decode(r))?;

        let action_count = r.check_count(action_count, 8)?;
        let mut actions = Vec::with_capacity(action_count);
        for _ in 0..action_count {
            let lod_count = r.u32()? as usize;
            let unk = r.u32()?;
            let lod_count = r.check_count(lod_count, 4)?;
            let lods = (0..lod_count).map(|_| r.f32()).collect::<Result<_, _>>()?;
            actions.push(Action { unk, lods });
        }

        let sprite_count = r.check_count(sprite_count, 4)?;
        let sprites: Vec<RecordRef> = (0..sprite_count)
            .map(|_| r.record_ref())
            .collect::<Result<_, _>>()?;
        let unk = r.u32()?;

        let def = Self {
            name,
            flags: flags & !Self::DERIVED,
            callback,
            bounds_ref,
            current_action,
            location,
            actions,
            sprites,
            unk,
        };
        if def.sprites.len() != def.lod_count() {
            return Err(PayloadError::invalid(
                "sprites",
                format!(
                    "{} sprite references for {} LODs",
                    def.sprites.len(),
                    def.lod_count()
                ),
            ));
        }
        Ok(def)
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        if self.sprites.len() != self.lod_count() {
            return Err(PayloadError::invalid(
                "sprites",
                format!(
                    "{} sprite references for {} LODs",
                    self.sprites.len(),
                    self.lod_count()
                ),
            ));
        }
        w.name(self.name);
        w.u32(
            self.flags & !Self::DERIVED
                | bit_if(&self.current_action, Self::HAS_CURRENT_ACTION)
                | bit_if(&self.location, Self::HAS_LOCATION),
        );
        w.name(self.callback);
        w.count(self.actions.len(), "actions")?;
        w.count(self.sprites.len(), "sprites")?;
        w.u32(self.bounds_ref);
        if let Some(action) = self.current_action {
            w.u32(action);
        }
        if let Some(location) = &self.location {
            location.encode(w);
        }
        for action in &self.actions {
            w.count(action.lods.len(), "lods")?;
            w.u32(action.unk);
            action.lods.iter().for_each(|&d| w.f32(d));
        }
        for &sprite in &self.sprites {
            w.record_ref(sprite);
        }
        w.u32(self.unk);
        Ok(())
    }
}

/// 0x15: a placed actor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Actor {
    /// Self-name.
    pub name: NameRef,
    /// Actor definition; absent for actors with no definition attached.
    pub def: RecordRef,
    /// Flags other than the field-presence bits.
    pub flags: u32,
    /// Bounding sphere record.
    pub sphere: RecordRef,
    /// Action to start in.
    pub current_action: Option<u32>,
    /// Placement.
    pub location: Option<Location>,
    /// Bounding radius override.
    pub bounding_radius: Option<f32>,
    /// Scale factor.
    pub scale: Option<f32>,
    /// Name of the attached sound.
    pub sound: Option<NameRef>,
    /// Baked vertex color track instance.
    pub rgb_track: Option<RecordRef>,
    /// Trailing user data, unscrambled.
    pub user_data: Vec<u8>,
}

impl Actor {
    /// Flag bit gating [`Actor::current_action`].
    pub const HAS_CURRENT_ACTION: u32 = 0x01;
    /// Flag bit gating [`Actor::location`].
    pub const HAS_LOCATION: u32 = 0x02;
    /// Flag bit gating [`Actor::bounding_radius`].
    pub const HAS_BOUNDING_RADIUS: u32 = 0x04;
    /// Flag bit gating [`Actor::scale`].
    pub const HAS_SCALE: u32 = 0x08;
    /// Flag bit gating [`Actor::sound`].
    pub const HAS_SOUND: u32 = 0x10;
    /// Flag bit gating [`Actor::rgb_track`].
    pub const HAS_RGB_TRACK: u32 = 0x100;
    const DERIVED: u32 = Self::HAS_CURRENT_ACTION
        | Self::HAS_LOCATION
        | Self::HAS_BOUNDING_RADIUS
        | Self::HAS_SCALE
        | Self::HAS_SOUND
        | Self::HAS_RGB_TRACK;
}

impl Payload for Actor {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let def = r.record_ref()?;
        let flags = r.u32()?;
        let sphere = r.record_ref()?;
        let current_action = gated(flags, Self::HAS_CURRENT_ACTION, || r.u32())?;
        let location = gated(flags, Self::HAS_LOCATION, || Location::decode(r))?;
        let bounding_radius = gated(flags, Self::HAS_BOUNDING_RADIUS, || r.f32())?;
        let scale = gated(flags, Self::HAS_SCALE, || r.f32())?;
        let sound = gated(flags, Self::HAS_SOUND, || r.name())?;
        let rgb_track = gated(flags, Self::HAS_RGB_TRACK, || r.record_ref())?;
        let len = r.count(1)?;
        let user_data = r.bytes(len)?;
        r.skip_pad4()?;
        Ok(Self {
            name,
            def,
            flags: flags & !Self::DERIVED,
            sphere,
            current_action,
            location,
            bounding_radius,
            scale,
            sound,
            rgb_track,
            user_data,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.def);
        w.u32(
            self.flags & !Self::DERIVED
                | bit_if(&self.current_action, Self::HAS_CURRENT_ACTION)
                | bit_if(&self.location, Self::HAS_LOCATION)
                | bit_if(&self.bounding_radius, Self::HAS_BOUNDING_RADIUS)
                | bit_if(&self.scale, Self::HAS_SCALE)
                | bit_if(&self.sound, Self::HAS_SOUND)
                | bit_if(&self.rgb_track, Self::HAS_RGB_TRACK),
        );
        w.record_ref(self.sphere);
        if let Some(action) = self.current_action {
            w.u32(action);
        }
        if let Some(location) = &self.location {
            location.encode(w);
        }
        if let Some(radius) = self.bounding_radius {
            w.f32(radius);
        }
        if let Some(scale) = self.scale {
            w.f32(scale);
        }
        if let Some(sound) = self.sound {
            w.name(sound);
        }
        if let Some(track) = self.rgb_track {
            w.record_ref(track);
        }
        w.count(self.user_data.len(), "user_data")?;
        w.bytes(&self.user_data);
        w.pad4();
        Ok(())
    }
}
