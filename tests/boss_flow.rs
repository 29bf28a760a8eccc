mod common;

use bevy::prelude::*;
use shmup_core::common::messages::HitRequest;
use shmup_core::common::signals::CombatSignal;
use shmup_core::config::{
    BossBehavior, BossStats, GameData, LevelScript, SpawnEvent,
};
use shmup_core::plugins::boss::{Boss, BossStage};
use shmup_core::plugins::combat::damage::{DamageSource, Resistances};
use shmup_core::plugins::progression::LevelScheduler;

fn boss_level() -> GameData {
    let mut data = GameData {
        start_level: "arena".into(),
        ..GameData::default()
    };
    data.bosses.insert(
        "warden".into(),
        BossStats {
            name: "Warden".into(),
            hp: 50,
            speed: 0.0,
            visual_scale: 1.0,
            behavior: BossBehavior::Hold,
            resistances: Resistances::default(),
            phases: Vec::new(),
        },
    );
    data.blocks.insert(
        "showdown".into(),
        vec![SpawnEvent {
            time_ms: 0,
            is_boss: true,
            actor_id: "warden".into(),
            y: 300.0,
        }],
    );
    data.levels.insert(
        "arena".into(),
        LevelScript {
            sequence: vec!["showdown".into()],
            next_level: None,
        },
    );
    data
}

fn boss_stage(app: &mut App) -> Option<BossStage> {
    let boss = common::single::<Boss>(app)?;
    app.world().get::<Boss>(boss).map(Boss::stage)
}

#[test]
fn defeating_the_boss_resumes_and_finishes_the_level() {
    let mut app = common::app_with_data(boss_level());

    common::step_until(&mut app, 20, |app| boss_stage(app).is_some());
    {
        let scheduler = app.world().resource::<LevelScheduler>();
        assert!(scheduler.boss_active());
        assert!(!scheduler.is_running());
    }

    common::step_until(&mut app, 400, |app| {
        boss_stage(app) == Some(BossStage::Active)
    });

    let boss = common::single::<Boss>(&mut app).expect("boss");
    app.world_mut().write_message(HitRequest::Damage {
        target: boss,
        source: DamageSource::new(1_000.0, "physical"),
    });

    // death delay, then progression runs out of blocks and finishes the level
    common::step_until(&mut app, 400, |app| {
        common::signals(app)
            .iter()
            .any(|s| matches!(s, CombatSignal::LevelFinished { .. }))
    });

    let signals = common::signals(&app);
    assert!(signals.contains(&CombatSignal::BossDefeated {
        name: "Warden".into()
    }));
    assert!(signals.contains(&CombatSignal::LevelFinished {
        level: "arena".into()
    }));
    let scheduler = app.world().resource::<LevelScheduler>();
    assert!(!scheduler.boss_active());
    assert!(scheduler.minion_timer().is_none());
}

#[test]
fn boss_ignores_damage_while_entering() {
    let mut app = common::app_with_data(boss_level());
    common::step_until(&mut app, 20, |app| {
        boss_stage(app) == Some(BossStage::Entering)
    });

    let boss = common::single::<Boss>(&mut app).expect("boss");
    app.world_mut().write_message(HitRequest::Damage {
        target: boss,
        source: DamageSource::new(1_000.0, "physical"),
    });
    common::step(&mut app, 3);

    assert_eq!(boss_stage(&mut app), Some(BossStage::Entering));
    assert!(
        !common::signals(&app)
            .iter()
            .any(|s| matches!(s, CombatSignal::BossDamaged { .. }))
    );
}
