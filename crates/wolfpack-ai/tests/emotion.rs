use wolfpack_ai::config::EmotionTuning;
use wolfpack_ai::emotion::{EmotionState, HealthCoupling};
use wolfpack_ai::Emotion;

const DT: f32 = 1.0 / 60.0;

#[test]
fn health_coupling_thresholds() {
    let tuning = EmotionTuning::default();
    let at = |health| HealthCoupling::for_health(health, &tuning);

    let healthy = at(1.0);
    assert_eq!(healthy.limp, 1.0);
    assert_eq!(healthy.feint_keep, 1.0);
    assert_eq!(healthy.need_help_rate, 0.0);
    assert!(!healthy.desperate);

    let scratched = at(0.6);
    assert_eq!(scratched.limp, tuning.limp_multiplier);
    assert_eq!(scratched.need_help_rate, 0.0);

    let wounded = at(0.45);
    assert_eq!(wounded.need_help_rate, tuning.need_help_rate);
    assert_eq!(wounded.feint_keep, 1.0);

    let scared = at(0.35);
    assert_eq!(scared.feint_keep, 0.5);
    assert!(!scared.desperate);

    let cornered = at(0.2);
    assert!(cornered.desperate);
    assert_eq!(cornered.need_help_rate, tuning.desperate_need_help_rate);
}

#[test]
fn a_hit_provokes_a_short_aggressive_window() {
    let tuning = EmotionTuning::default();
    let mut emotion = EmotionState::default();

    emotion.on_damage_taken(0.05, &tuning);
    emotion.update(DT, 0.95, &tuning);
    assert_eq!(emotion.current, Emotion::Aggressive);
    assert!(Emotion::Aggressive.aggression_bias() > 0.0);

    for _ in 0..100 {
        emotion.update(DT, 0.95, &tuning);
    }
    assert_eq!(emotion.provoked, 0.0);
    assert_eq!(emotion.current, Emotion::Calm);
}

#[test]
fn low_health_holds_a_fear_floor() {
    let tuning = EmotionTuning::default();
    let mut emotion = EmotionState::default();

    for _ in 0..600 {
        emotion.update(DT, 0.35, &tuning);
    }
    assert!(emotion.fear >= tuning.fear_floor);
}

#[test]
fn near_death_forces_desperation() {
    let tuning = EmotionTuning::default();
    let mut emotion = EmotionState::default();
    emotion.on_packmate_lost();
    emotion.on_packmate_lost();
    emotion.on_packmate_lost();

    let coupling = emotion.update(DT, 0.15, &tuning);
    assert!(coupling.desperate);
    assert_eq!(emotion.current, Emotion::Desperate);
    assert_eq!(emotion.desperation, 1.0);
}

#[test]
fn drives_pick_the_emotion_by_priority() {
    let tuning = EmotionTuning::default();

    let mut grieving = EmotionState::default();
    for _ in 0..3 {
        grieving.on_packmate_lost();
    }
    grieving.provoked = 1.0;
    grieving.update(DT, 1.0, &tuning);
    assert_eq!(grieving.current, Emotion::Fearful);

    let mut thwarted = EmotionState::default();
    for _ in 0..4 {
        thwarted.on_attack_failed();
    }
    thwarted.update(DT, 1.0, &tuning);
    assert_eq!(thwarted.current, Emotion::Frustrated);

    let mut winning = EmotionState::default();
    winning.on_attack_landed();
    winning.on_attack_landed();
    winning.update(DT, 1.0, &tuning);
    assert_eq!(winning.current, Emotion::Confident);
}

#[test]
fn drives_decay_toward_neutral() {
    let tuning = EmotionTuning::default();
    let mut emotion = EmotionState {
        fear: 1.0,
        confidence: 0.0,
        ..EmotionState::default()
    };

    emotion.update(1.0, 1.0, &tuning);

    assert!((emotion.fear - 0.9).abs() < 1e-6);
    assert!((emotion.confidence - 0.05).abs() < 1e-6);
}

#[test]
fn clamp_repairs_hostile_values() {
    let mut emotion = EmotionState {
        fear: f32::NAN,
        frustration: 4.0,
        confidence: -1.0,
        ..EmotionState::default()
    };
    emotion.clamp();
    assert_eq!(emotion.fear, 0.0);
    assert_eq!(emotion.frustration, 1.0);
    assert_eq!(emotion.confidence, 0.0);
}
