//! End-to-end scenarios driven through `Simulation`.

use std::collections::HashMap;
use std::time::Duration;

use medimix_board::{Board, Medication, Rearrangement};

use crate::clock::{GameClock, ShiftWindow};
use crate::error::CommandError;
use crate::event::SimEvent;
use crate::patient::{Lane, Mood, PatientId, PatientStatus};
use crate::registry::Credit;
use crate::simulation::Simulation;
use crate::staffing::{ConsultantId, ConsultantStatus, HelpTier, UnlockRequirement};

use super::helpers::{
    admit, day_roster, quiet_board, roomy_config, run_ticks, stage_board, staged_sim,
    tablix_trap_board,
};

// =============================================================================
// Patients
// =============================================================================

#[test]
fn test_unserved_normal_patient_fails_after_120_ticks() {
    let mut sim = staged_sim(3, roomy_config());
    let patient = admit(&mut sim, Lane::Normal, &[(Medication::Gelux, 5)]);

    run_ticks(&mut sim, 119);
    assert_eq!(
        sim.registry().get(patient).unwrap().status,
        PatientStatus::Waiting
    );

    sim.step();
    let p = sim.registry().get(patient).unwrap();
    assert_eq!(p.status, PatientStatus::Failed);
    assert_eq!(p.mood, Mood::Frustrated);
    assert!(!p.settled);

    sim.take_events();
    sim.step();
    assert!(sim.registry().get(patient).is_none());
    let failed = sim.take_events().into_iter().any(|record| {
        record.event
            == SimEvent::PatientFailed {
                patient,
                points_lost: 30,
            }
    });
    assert!(failed);
}

#[test]
fn test_dispense_overflow_is_wasted_not_passed_on() {
    let mut sim = staged_sim(11, roomy_config());
    stage_board(&mut sim, tablix_trap_board());
    let first = admit(&mut sim, Lane::Normal, &[(Medication::Tablix, 2)]);
    let _second = admit(&mut sim, Lane::Normal, &[(Medication::Tablix, 1)]);

    let outcome = sim.swap(2, 3).unwrap();
    assert!(outcome.is_committed());

    let (credits, wasted) = sim
        .take_events()
        .into_iter()
        .find_map(|record| match record.event {
            SimEvent::Dispensed { credits, wasted } => Some((credits, wasted)),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        credits,
        vec![Credit {
            patient: first,
            medication: Medication::Tablix,
            units: 2,
        }]
    );
    assert_eq!(wasted.get(Medication::Tablix), 1);
    assert_eq!(
        sim.registry().get(first).unwrap().status,
        PatientStatus::Completed
    );
}

#[test]
fn test_swap_leaves_a_stable_board() {
    let mut sim = staged_sim(12, roomy_config());
    stage_board(&mut sim, tablix_trap_board());
    sim.swap(2, 3).unwrap();
    assert!(sim.board().is_full());
    assert!(sim.engine().is_stable());
}

#[test]
fn test_settle_on_quiet_board_does_nothing() {
    let mut sim = staged_sim(13, roomy_config());
    stage_board(
        &mut sim,
        Board::from_medications(8, &quiet_board()).unwrap(),
    );
    let resolution = sim.settle_board();
    assert_eq!(resolution.cascades, 0);
    assert_eq!(resolution.settle_passes, 0);
    assert!(sim.take_events().is_empty());
}

#[test]
fn test_mood_never_improves() {
    let mut sim = Simulation::new(99, roomy_config()).unwrap();
    let mut last: HashMap<PatientId, Mood> = HashMap::new();

    for _ in 0..400 {
        sim.step();
        for patient in sim.registry().patients() {
            if let Some(previous) = last.insert(patient.id, patient.mood) {
                assert!(patient.mood >= previous, "{previous} -> {}", patient.mood);
            }
        }
    }
}

#[test]
fn test_arrivals_use_the_configured_business_hours() {
    let mut config = roomy_config();
    config.staffing.business_hours = ShiftWindow::new(10, 17);
    let sim = Simulation::new(5, config).unwrap();

    let hours = sim.registry().lane_odds().business_hours;
    assert_eq!(hours, ShiftWindow::new(10, 17));
    assert!(!hours.contains(GameClock::at_hour(9)));
}

#[test]
fn test_pin_moves_patient_to_front() {
    let mut sim = staged_sim(14, roomy_config());
    let _emergency = admit(&mut sim, Lane::Emergency, &[(Medication::Injecta, 1)]);
    let normal = admit(&mut sim, Lane::Normal, &[(Medication::Capsulon, 1)]);

    assert_ne!(sim.registry().queue_order()[0].id, normal);
    assert_eq!(sim.pin(normal), Ok(true));
    assert_eq!(sim.snapshot().patients[0].id, normal);
    assert_eq!(
        sim.pin(PatientId::new(999)),
        Err(CommandError::UnknownPatient(PatientId::new(999)))
    );
}

// =============================================================================
// Consultants
// =============================================================================

#[test]
fn test_assignment_runs_until_completion() {
    let mut sim = staged_sim(21, roomy_config());
    stage_board(&mut sim, tablix_trap_board());
    let patient = admit(&mut sim, Lane::Normal, &[(Medication::Tablix, 3)]);
    let other = admit(&mut sim, Lane::Normal, &[(Medication::Gelux, 5)]);
    let first = ConsultantId::new(1);
    let second = ConsultantId::new(2);

    sim.assign(patient, first).unwrap();
    assert_eq!(
        sim.registry().get(patient).unwrap().status,
        PatientStatus::Dispensing
    );
    assert_eq!(
        sim.staffing().consultant(first).unwrap().status,
        ConsultantStatus::Fetching
    );
    assert_eq!(
        sim.assign(patient, second),
        Err(CommandError::PatientNotWaiting(patient))
    );
    assert_eq!(
        sim.assign(other, first),
        Err(CommandError::ConsultantUnavailable(first))
    );

    sim.swap(2, 3).unwrap();
    assert_eq!(
        sim.registry().get(patient).unwrap().status,
        PatientStatus::Completed
    );
    assert_eq!(
        sim.staffing().consultant(first).unwrap().status,
        ConsultantStatus::Busy
    );

    sim.take_events();
    sim.step();
    let consultant = sim.staffing().consultant(first).unwrap();
    assert_eq!(consultant.status, ConsultantStatus::Available);
    assert!(consultant.available);
    assert_eq!(consultant.stamina, 95);
    assert_eq!(consultant.current_order, None);
    assert!(sim.ledger().stats.completed >= 1);
    assert_eq!(sim.ledger().currency, 10 * sim.ledger().stats.completed);

    let released = sim.take_events().into_iter().any(|record| {
        record.event
            == SimEvent::ConsultantReleased {
                consultant: first,
                patient,
            }
    });
    assert!(released);
}

#[test]
fn test_assigned_patient_times_out_and_frees_consultant() {
    let mut sim = staged_sim(23, roomy_config());
    let patient = admit(&mut sim, Lane::Emergency, &[(Medication::Gelux, 5)]);
    let consultant = ConsultantId::new(1);
    sim.assign(patient, consultant).unwrap();

    run_ticks(&mut sim, 19);
    assert_eq!(
        sim.registry().get(patient).unwrap().status,
        PatientStatus::Dispensing
    );

    sim.step();
    let p = sim.registry().get(patient).unwrap();
    assert_eq!(p.status, PatientStatus::Failed);
    assert_eq!(p.wait_remaining, 0);
    assert_eq!(p.mood, Mood::Calm);
    assert_eq!(
        sim.staffing().consultant(consultant).unwrap().status,
        ConsultantStatus::Fetching
    );

    sim.take_events();
    sim.step();
    assert!(sim.registry().get(patient).is_none());
    let c = sim.staffing().consultant(consultant).unwrap();
    assert_eq!(c.status, ConsultantStatus::Available);
    assert_eq!(c.current_order, None);
    assert_eq!(c.stamina, 95);

    let events: Vec<SimEvent> = sim.take_events().into_iter().map(|r| r.event).collect();
    assert!(events.contains(&SimEvent::PatientFailed {
        patient,
        points_lost: 30,
    }));
    assert!(events.contains(&SimEvent::ConsultantReleased {
        consultant,
        patient,
    }));
}

#[test]
fn test_closed_consultant_cannot_be_assigned() {
    let mut sim = staged_sim(22, roomy_config());
    let patient = admit(&mut sim, Lane::Normal, &[(Medication::Gelux, 1)]);
    // Naledi Khumalo is on standby and closed during business hours.
    let standby = ConsultantId::new(5);
    assert_eq!(
        sim.assign(patient, standby),
        Err(CommandError::ConsultantUnavailable(standby))
    );
    assert_eq!(
        sim.assign(patient, ConsultantId::new(42)),
        Err(CommandError::UnknownConsultant(ConsultantId::new(42)))
    );
}

// =============================================================================
// Call for help
// =============================================================================

#[test]
fn test_three_helpers_form_a_team() {
    let mut config = roomy_config();
    config.staffing.consultants = day_roster(3);
    let mut sim = staged_sim(31, config);

    assert_eq!(sim.call_for_help(), Ok(HelpTier::Team));
    assert!(sim
        .staffing()
        .consultants()
        .iter()
        .all(|c| c.status == ConsultantStatus::Helping));
    assert_eq!(sim.call_for_help(), Err(CommandError::AssistInProgress));

    sim.end_help().unwrap();
    for consultant in sim.staffing().consultants() {
        assert_eq!(consultant.status, ConsultantStatus::Available);
        assert_eq!(consultant.stamina, 95);
        assert_eq!(consultant.help_cooldown, Some(20));
    }
    assert_eq!(sim.call_for_help(), Err(CommandError::NoHelpersAvailable));

    run_ticks(&mut sim, 20);
    assert_eq!(sim.call_for_help(), Ok(HelpTier::Team));
}

#[test]
fn test_team_assist_expires_after_ten_seconds() {
    let mut config = roomy_config();
    config.staffing.consultants = day_roster(3);
    let mut sim = staged_sim(32, config);
    sim.call_for_help().unwrap();
    assert!(!sim.assist().unwrap().highlighted().is_empty());

    let progress = sim.advance_assist(Duration::from_secs(10));
    assert_eq!(progress.rearrangements_due, 5);
    assert!(progress.expired);
    assert!(sim.assist().is_none());
    assert!(sim.engine().is_stable());
    for consultant in sim.staffing().consultants() {
        assert_eq!(consultant.stamina, 95);
    }

    let ended = sim.take_events().into_iter().any(|record| {
        matches!(
            record.event,
            SimEvent::HelpEnded {
                tier: HelpTier::Team,
                expired: true,
                ..
            }
        )
    });
    assert!(ended);
}

#[test]
fn test_rearrangement_skips_candidates_that_revert() {
    let mut sim = staged_sim(34, roomy_config());
    stage_board(&mut sim, tablix_trap_board());
    let ranked = [
        Rearrangement {
            from: 40,
            to: 41,
            score: 90,
        },
        Rearrangement {
            from: 2,
            to: 3,
            score: 30,
        },
    ];

    let report = sim.first_ranked_swap(&ranked).unwrap();
    assert_eq!((report.from, report.to), (2, 3));
    assert_eq!(report.dispensed.get(Medication::Tablix), 3);
}

#[test]
fn test_solo_assist_only_highlights() {
    let mut config = roomy_config();
    config.staffing.consultants = day_roster(1);
    let mut sim = staged_sim(33, config);
    assert_eq!(sim.call_for_help(), Ok(HelpTier::Solo));

    let before = sim.board().clone();
    let progress = sim.advance_assist(Duration::from_secs(4));
    assert_eq!(progress.rearrangements_due, 0);
    assert_eq!(sim.board(), &before);

    let progress = sim.advance_assist(Duration::from_secs(60));
    assert!(progress.expired);
    assert_eq!(sim.staffing().consultants()[0].stamina, 85);
}

#[test]
fn test_cancel_assist_stops_rearrangements() {
    let mut config = roomy_config();
    config.staffing.consultants = day_roster(2);
    let mut sim = staged_sim(34, config);
    assert_eq!(sim.call_for_help(), Ok(HelpTier::Pair));
    assert!(sim.cancel_assist());

    let before = sim.board().clone();
    let progress = sim.advance_assist(Duration::from_secs(30));
    assert_eq!(progress.rearrangements_due, 0);
    assert_eq!(sim.board(), &before);
    for consultant in sim.staffing().consultants() {
        assert_eq!(consultant.status, ConsultantStatus::Available);
        assert_eq!(consultant.stamina, 100);
        assert_eq!(consultant.help_cooldown, None);
    }
}

// =============================================================================
// Abilities
// =============================================================================

#[test]
fn test_time_freeze_holds_patient_timers() {
    let mut config = roomy_config();
    config.staffing.rotation_interval_ticks = 10_000;
    if let Some(ability) = config.staffing.managers[0].ability.as_mut() {
        ability.requirement = UnlockRequirement::CompletedPatients(0);
    }
    let mut sim = staged_sim(41, config);
    let patient = admit(&mut sim, Lane::Normal, &[(Medication::Gelux, 5)]);

    sim.step();
    let wait = sim.registry().get(patient).unwrap().wait_remaining;
    let effect = sim.activate_special_ability("time freeze").unwrap();
    assert_eq!(effect.ends_at, sim.clock().after_ticks(5));
    assert_eq!(
        sim.activate_special_ability("Time Freeze"),
        Err(CommandError::AbilityActive)
    );
    assert_eq!(sim.staffing().current_manager().unwrap().stamina, 80);

    run_ticks(&mut sim, 5);
    assert!(sim.active_effect().is_none());
    assert_eq!(sim.registry().get(patient).unwrap().wait_remaining, wait);

    sim.step();
    assert_eq!(sim.registry().get(patient).unwrap().wait_remaining, wait - 1);
}

// =============================================================================
// Game over
// =============================================================================

#[test]
fn test_game_over_freezes_the_session() {
    let mut config = roomy_config();
    config.economy.starting_points = 1;
    let mut sim = Simulation::new(51, config).unwrap();

    for _ in 0..500 {
        if sim.is_game_over() {
            break;
        }
        sim.step();
    }
    assert!(sim.is_game_over());
    assert!(sim.ledger().dash_points <= 0);

    let tick = sim.tick();
    let hash = sim.state_hash();
    sim.step();
    assert_eq!(sim.tick(), tick);
    assert_eq!(sim.swap(0, 1), Err(CommandError::GameOver));
    assert_eq!(sim.call_for_help(), Err(CommandError::GameOver));
    assert_eq!(
        sim.activate_special_ability("Time Freeze"),
        Err(CommandError::GameOver)
    );
    assert_eq!(sim.state_hash(), hash);

    let over = sim
        .take_events()
        .into_iter()
        .filter(|record| matches!(record.event, SimEvent::GameOver { .. }))
        .count();
    assert_eq!(over, 1);
}
