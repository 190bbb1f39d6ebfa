//! Static upgrade/module catalogs and boss dialogue
//!
//! Read-only reference data. Modules are mutually exclusive once chosen;
//! upgrades may repeat. Stat-shaped module effects live in one factor table
//! so current stats can always be recomputed as `base x product of factors`;
//! behavioral effects (piercing, homing, passives, ...) are gated on module
//! membership where they apply.

/// Packed 0xRRGGBB colors for presentation-facing data
pub mod color {
    pub const RED: u32 = 0xFF3232;
    pub const GREEN: u32 = 0x32FF32;
    pub const BLUE: u32 = 0x3296FF;
    pub const YELLOW: u32 = 0xFFFF32;
    pub const CYAN: u32 = 0x32FFFF;
    pub const MAGENTA: u32 = 0xFF32FF;
    pub const GRAY: u32 = 0x646464;
    pub const ORANGE: u32 = 0xFFA500;
    pub const PURPLE: u32 = 0x8A2BE2;
    pub const GOLD: u32 = 0xFFD700;
}

/// Permanent, mutually-exclusive gameplay modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ModuleId {
    ExplosiveRounds,
    FireRing,
    PiercingRounds,
    Regeneration,
    MultiShot,
    HomingMissiles,
    ExpMagnet,
    DamageAura,
    TimeSlow,
    ShieldGenerator,
    RapidFire,
    SniperMode,
    ChainLightning,
    Berserker,
    Vampiric,
    Overcharge,
    Ricochet,
    ArmorPlating,
    LaserSight,
    PhaseShift,
}

impl ModuleId {
    pub const COUNT: usize = 20;

    pub const ALL: [ModuleId; Self::COUNT] = [
        ModuleId::ExplosiveRounds,
        ModuleId::FireRing,
        ModuleId::PiercingRounds,
        ModuleId::Regeneration,
        ModuleId::MultiShot,
        ModuleId::HomingMissiles,
        ModuleId::ExpMagnet,
        ModuleId::DamageAura,
        ModuleId::TimeSlow,
        ModuleId::ShieldGenerator,
        ModuleId::RapidFire,
        ModuleId::SniperMode,
        ModuleId::ChainLightning,
        ModuleId::Berserker,
        ModuleId::Vampiric,
        ModuleId::Overcharge,
        ModuleId::Ricochet,
        ModuleId::ArmorPlating,
        ModuleId::LaserSight,
        ModuleId::PhaseShift,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> &'static ModuleDef {
        &MODULES[self.index()]
    }

    /// Multiplicative stat effects (upside and downside together).
    /// Hit-time modifiers (Damage Aura output, Sniper, Berserker, Overcharge)
    /// and per-bullet penalties (Piercing, Multi-Shot) are applied in the
    /// combat resolver instead and deliberately absent here.
    pub fn stat_factors(self) -> StatFactors {
        let id = StatFactors::IDENTITY;
        match self {
            ModuleId::ExplosiveRounds => StatFactors { fire_rate: 0.8, ..id },
            ModuleId::FireRing => StatFactors { bullet_speed: 0.85, ..id },
            ModuleId::Regeneration => StatFactors { max_hp: 0.9, ..id },
            ModuleId::HomingMissiles => StatFactors { bullet_speed: 0.8, ..id },
            ModuleId::DamageAura => StatFactors { incoming: 1.3, ..id },
            ModuleId::TimeSlow => StatFactors { fire_rate: 0.7, ..id },
            ModuleId::ShieldGenerator => StatFactors { fire_rate: 0.85, ..id },
            ModuleId::RapidFire => StatFactors { fire_rate: 1.5, damage: 0.75, ..id },
            ModuleId::SniperMode => StatFactors { fire_rate: 0.5, ..id },
            ModuleId::ChainLightning => StatFactors { damage: 0.8, ..id },
            ModuleId::Vampiric => StatFactors { max_hp: 0.8, ..id },
            ModuleId::Ricochet => StatFactors { bullet_speed: 0.6, ..id },
            ModuleId::ArmorPlating => StatFactors { incoming: 0.7, bullet_speed: 0.7, ..id },
            ModuleId::LaserSight => StatFactors { bullet_speed: 1.6, fire_rate: 0.85, ..id },
            ModuleId::PhaseShift => StatFactors { fire_rate: 0.8, ..id },
            _ => id,
        }
    }
}

/// Per-module multiplicative stat adjustments
#[derive(Debug, Clone, Copy)]
pub struct StatFactors {
    pub damage: f32,
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub max_hp: f32,
    /// Incoming-damage multiplier (>1 means the player takes more)
    pub incoming: f32,
}

impl StatFactors {
    pub const IDENTITY: StatFactors = StatFactors {
        damage: 1.0,
        fire_rate: 1.0,
        bullet_speed: 1.0,
        max_hp: 1.0,
        incoming: 1.0,
    };

    pub fn combine(self, other: StatFactors) -> StatFactors {
        StatFactors {
            damage: self.damage * other.damage,
            fire_rate: self.fire_rate * other.fire_rate,
            bullet_speed: self.bullet_speed * other.bullet_speed,
            max_hp: self.max_hp * other.max_hp,
            incoming: self.incoming * other.incoming,
        }
    }
}

/// Display-facing module definition
#[derive(Debug)]
pub struct ModuleDef {
    pub id: ModuleId,
    pub name: &'static str,
    pub upside: &'static str,
    pub downside: &'static str,
    pub color: u32,
}

/// Indexed by `ModuleId` discriminant
pub static MODULES: [ModuleDef; ModuleId::COUNT] = [
    ModuleDef {
        id: ModuleId::ExplosiveRounds,
        name: "Explosive Rounds",
        upside: "+50% splash damage in radius",
        downside: "-20% fire rate",
        color: color::ORANGE,
    },
    ModuleDef {
        id: ModuleId::FireRing,
        name: "Fire Ring",
        upside: "5 damage/sec in 150 radius",
        downside: "-15% bullet speed",
        color: color::RED,
    },
    ModuleDef {
        id: ModuleId::PiercingRounds,
        name: "Piercing Rounds",
        upside: "Hit up to 3 targets",
        downside: "-25% damage per bullet",
        color: color::CYAN,
    },
    ModuleDef {
        id: ModuleId::Regeneration,
        name: "Regeneration",
        upside: "Restore 2 HP/second",
        downside: "-10% max HP",
        color: color::GREEN,
    },
    ModuleDef {
        id: ModuleId::MultiShot,
        name: "Multi-Shot",
        upside: "3 bullets per shot",
        downside: "-30% damage per bullet",
        color: color::YELLOW,
    },
    ModuleDef {
        id: ModuleId::HomingMissiles,
        name: "Homing Missiles",
        upside: "Auto-aim within 300 units",
        downside: "-20% bullet speed",
        color: color::MAGENTA,
    },
    ModuleDef {
        id: ModuleId::ExpMagnet,
        name: "EXP Magnet",
        upside: "+50% EXP from kills",
        downside: "Enemies spawn 15% faster",
        color: color::PURPLE,
    },
    ModuleDef {
        id: ModuleId::DamageAura,
        name: "Damage Aura",
        upside: "+40% damage output",
        downside: "Take +30% damage",
        color: color::RED,
    },
    ModuleDef {
        id: ModuleId::TimeSlow,
        name: "Time Slow Field",
        upside: "-40% enemy speed in 200 radius",
        downside: "-30% fire rate",
        color: color::BLUE,
    },
    ModuleDef {
        id: ModuleId::ShieldGenerator,
        name: "Shield Generator",
        upside: "Absorbs damage, regens 5/2sec",
        downside: "-15% fire rate",
        color: color::CYAN,
    },
    ModuleDef {
        id: ModuleId::RapidFire,
        name: "Rapid Fire",
        upside: "+50% fire rate",
        downside: "-25% damage per bullet",
        color: color::YELLOW,
    },
    ModuleDef {
        id: ModuleId::SniperMode,
        name: "Sniper Mode",
        upside: "+100% damage per bullet",
        downside: "-50% fire rate",
        color: color::BLUE,
    },
    ModuleDef {
        id: ModuleId::ChainLightning,
        name: "Chain Lightning",
        upside: "50% damage to nearby enemies",
        downside: "-20% base damage",
        color: color::CYAN,
    },
    ModuleDef {
        id: ModuleId::Berserker,
        name: "Berserker Mode",
        upside: "+75% damage under 50% HP",
        downside: "Cannot heal above 50% HP",
        color: color::RED,
    },
    ModuleDef {
        id: ModuleId::Vampiric,
        name: "Vampiric Rounds",
        upside: "Heal 10 HP per kill",
        downside: "-20% max HP",
        color: color::MAGENTA,
    },
    ModuleDef {
        id: ModuleId::Overcharge,
        name: "Overcharge",
        upside: "+15% damage output",
        downside: "Lose 1 HP/second",
        color: color::ORANGE,
    },
    ModuleDef {
        id: ModuleId::Ricochet,
        name: "Ricochet Rounds",
        upside: "Dense, heavy projectiles",
        downside: "-40% bullet speed",
        color: color::CYAN,
    },
    ModuleDef {
        id: ModuleId::ArmorPlating,
        name: "Armor Plating",
        upside: "Take 30% less damage",
        downside: "-30% bullet speed",
        color: color::GRAY,
    },
    ModuleDef {
        id: ModuleId::LaserSight,
        name: "Laser Sight",
        upside: "+60% bullet speed",
        downside: "-15% fire rate",
        color: color::RED,
    },
    ModuleDef {
        id: ModuleId::PhaseShift,
        name: "Phase Shift",
        upside: "2 sec invuln every 8 sec",
        downside: "-20% fire rate",
        color: color::PURPLE,
    },
];

/// Upgrade rarity tiers, weighted for offer rolls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn weight(self) -> u32 {
        match self {
            Rarity::Common => 60,
            Rarity::Rare => 28,
            Rarity::Epic => 10,
            Rarity::Legendary => 2,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            Rarity::Common => 0xC8C8C8,
            Rarity::Rare => 0x6496FF,
            Rarity::Epic => 0xA020F0,
            Rarity::Legendary => color::GOLD,
        }
    }
}

/// Permanent, repeatable numeric buffs to base stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum UpgradeId {
    SharpenedRounds,
    HeavyPayload,
    DevastatorCore,
    TriggerJob,
    Autoloader,
    VelocityCoils,
    RailgunBarrel,
    PlatedHull,
    ReinforcedHull,
    FieldRepair,
    NeuralUplink,
    SingularityRounds,
}

impl UpgradeId {
    pub const COUNT: usize = 12;

    pub const ALL: [UpgradeId; Self::COUNT] = [
        UpgradeId::SharpenedRounds,
        UpgradeId::HeavyPayload,
        UpgradeId::DevastatorCore,
        UpgradeId::TriggerJob,
        UpgradeId::Autoloader,
        UpgradeId::VelocityCoils,
        UpgradeId::RailgunBarrel,
        UpgradeId::PlatedHull,
        UpgradeId::ReinforcedHull,
        UpgradeId::FieldRepair,
        UpgradeId::NeuralUplink,
        UpgradeId::SingularityRounds,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> &'static UpgradeDef {
        &UPGRADES[self.index()]
    }
}

/// What an upgrade does to the player's *base* stats
#[derive(Debug, Clone, Copy)]
pub enum UpgradeEffect {
    /// Flat base damage
    Damage(f32),
    /// Shots per second
    FireRate(f32),
    /// Units per second
    BulletSpeed(f32),
    /// Flat base max HP; also heals by the same amount
    MaxHp(f32),
    /// Additive experience multiplier
    ExpMultiplier(f32),
    /// One-time heal, no stat change
    Repair(f32),
}

#[derive(Debug)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    pub name: &'static str,
    pub rarity: Rarity,
    pub effect: UpgradeEffect,
}

/// Indexed by `UpgradeId` discriminant
pub static UPGRADES: [UpgradeDef; UpgradeId::COUNT] = [
    UpgradeDef {
        id: UpgradeId::SharpenedRounds,
        name: "Sharpened Rounds",
        rarity: Rarity::Common,
        effect: UpgradeEffect::Damage(3.0),
    },
    UpgradeDef {
        id: UpgradeId::HeavyPayload,
        name: "Heavy Payload",
        rarity: Rarity::Rare,
        effect: UpgradeEffect::Damage(6.0),
    },
    UpgradeDef {
        id: UpgradeId::DevastatorCore,
        name: "Devastator Core",
        rarity: Rarity::Epic,
        effect: UpgradeEffect::Damage(12.0),
    },
    UpgradeDef {
        id: UpgradeId::TriggerJob,
        name: "Trigger Job",
        rarity: Rarity::Common,
        effect: UpgradeEffect::FireRate(0.5),
    },
    UpgradeDef {
        id: UpgradeId::Autoloader,
        name: "Autoloader",
        rarity: Rarity::Rare,
        effect: UpgradeEffect::FireRate(1.0),
    },
    UpgradeDef {
        id: UpgradeId::VelocityCoils,
        name: "Velocity Coils",
        rarity: Rarity::Common,
        effect: UpgradeEffect::BulletSpeed(40.0),
    },
    UpgradeDef {
        id: UpgradeId::RailgunBarrel,
        name: "Railgun Barrel",
        rarity: Rarity::Epic,
        effect: UpgradeEffect::BulletSpeed(90.0),
    },
    UpgradeDef {
        id: UpgradeId::PlatedHull,
        name: "Plated Hull",
        rarity: Rarity::Common,
        effect: UpgradeEffect::MaxHp(15.0),
    },
    UpgradeDef {
        id: UpgradeId::ReinforcedHull,
        name: "Reinforced Hull",
        rarity: Rarity::Rare,
        effect: UpgradeEffect::MaxHp(30.0),
    },
    UpgradeDef {
        id: UpgradeId::FieldRepair,
        name: "Field Repair",
        rarity: Rarity::Common,
        effect: UpgradeEffect::Repair(25.0),
    },
    UpgradeDef {
        id: UpgradeId::NeuralUplink,
        name: "Neural Uplink",
        rarity: Rarity::Rare,
        effect: UpgradeEffect::ExpMultiplier(0.2),
    },
    UpgradeDef {
        id: UpgradeId::SingularityRounds,
        name: "Singularity Rounds",
        rarity: Rarity::Legendary,
        effect: UpgradeEffect::Damage(15.0),
    },
];

/// Milestone lines surfaced every 5 levels before the boss fight
pub static LEVEL_DIALOGUES: [&str; 5] = [
    "So, you made it to level 5? Cute.",
    "Level 10 already? Someone's been practicing.",
    "Level 15... I'm almost impressed. Almost.",
    "Level 20? You're really trying to meet me, aren't you?",
    "Level 25... Hope you're ready. I don't do warm welcomes.",
];

pub static BOSS_TAUNTS: [&str; 6] = [
    "Finally! I was getting bored waiting for you.",
    "Is that all you've got? Pathetic.",
    "You call that damage? I've seen stronger breezes.",
    "Still alive? Lucky shot.",
    "This is... moderately entertaining.",
    "You're tougher than you look. Barely.",
];

pub const BOSS_INTRO: &str = "Finally! I was getting bored waiting for you.";
pub const BOSS_DEFEAT: &str = "Impossible... How did you\u{2014}";
pub const BOSS_WIN: &str = "Predictable. Better luck next time... if there is one.";
