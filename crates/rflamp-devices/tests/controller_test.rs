//! Lamp controller tests.
//!
//! All tests run on a paused tokio clock: pacing delays resolve instantly but
//! the recorded send times still show the gaps.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use common::{RecordingTransport, desk_lamp, dimmer, repeat, switch_lamp};
use rflamp_commands::LampCommand;
use rflamp_core::{CoreError, PowerState};
use rflamp_devices::{LampController, LampError, TurnOnRequest};

const PACING: Duration = Duration::from_millis(300);

fn controller(config: rflamp_core::LampConfig, transport: &Arc<RecordingTransport>) -> LampController {
    LampController::new(&config, transport.clone()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_turn_on_with_brightness_end_to_end() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);

    let state = lamp
        .turn_on(TurnOnRequest::new().with_brightness(128))
        .await
        .unwrap();

    let mut expected = vec![LampCommand::Toggle];
    expected.extend(repeat(LampCommand::BrightnessDown, 4));
    assert_eq!(transport.commands(), expected);

    let snapshot = lamp.snapshot().await;
    assert!(snapshot.is_on());
    assert_eq!(snapshot.brightness_level(), Some(6));
    assert_eq!(state.power, PowerState::On);
    assert_eq!(state.brightness, Some(153));
}

#[tokio::test(start_paused = true)]
async fn test_pulses_are_paced() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);

    lamp.turn_on(
        TurnOnRequest::new()
            .with_brightness(128)
            .with_color_temp(6500),
    )
    .await
    .unwrap();

    // toggle, 4 brightness steps, 3 color temperature steps
    let gaps = transport.gaps();
    assert_eq!(gaps.len(), 7);
    assert!(gaps.iter().all(|gap| *gap >= PACING), "gaps: {:?}", gaps);
}

#[tokio::test(start_paused = true)]
async fn test_turn_on_with_color_temp_cycles_forward() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);

    let state = lamp
        .turn_on(TurnOnRequest::new().with_color_temp(6500))
        .await
        .unwrap();

    let mut expected = vec![LampCommand::Toggle];
    expected.extend(repeat(LampCommand::CctToggle, 3));
    assert_eq!(transport.commands(), expected);
    assert_eq!(state.color_temp_kelvin, Some(6500));

    // Back to the warmest preset wraps around in a single step
    transport.clear();
    lamp.set_color_temp(2700).await.unwrap();
    assert_eq!(transport.commands(), vec![LampCommand::CctToggle]);
    assert_eq!(lamp.snapshot().await.cct_level(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_turn_off_when_off_sends_nothing() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);
    let before = lamp.snapshot().await;

    let state = lamp.turn_off().await.unwrap();

    assert!(transport.commands().is_empty());
    assert_eq!(lamp.snapshot().await, before);
    assert_eq!(state.power, PowerState::Off);
}

#[tokio::test(start_paused = true)]
async fn test_turn_on_when_on_skips_toggle() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);
    lamp.restore_state(true, Some(153), None).await.unwrap();

    lamp.turn_on(TurnOnRequest::new().with_brightness(255))
        .await
        .unwrap();

    assert_eq!(transport.commands(), repeat(LampCommand::BrightnessUp, 4));
    assert_eq!(lamp.snapshot().await.brightness_level(), Some(10));
}

#[tokio::test(start_paused = true)]
async fn test_turn_off_keeps_levels() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);

    lamp.turn_on(TurnOnRequest::new().with_brightness(128))
        .await
        .unwrap();
    let off = lamp.turn_off().await.unwrap();
    assert_eq!(off.power, PowerState::Off);
    assert_eq!(off.brightness, None);
    assert_eq!(off.color_temp_kelvin, None);
    assert_eq!(lamp.snapshot().await.brightness_level(), Some(6));

    transport.clear();
    let on = lamp.turn_on(TurnOnRequest::new()).await.unwrap();
    assert_eq!(transport.commands(), vec![LampCommand::Toggle]);
    assert_eq!(on.brightness, Some(153));
}

#[tokio::test(start_paused = true)]
async fn test_restore_then_full_brightness() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);
    lamp.restore_state(true, Some(51), None).await.unwrap();
    assert!(transport.commands().is_empty());
    assert_eq!(lamp.snapshot().await.brightness_level(), Some(2));

    lamp.set_brightness(255).await.unwrap();

    assert_eq!(transport.commands(), repeat(LampCommand::BrightnessUp, 8));
}

#[tokio::test(start_paused = true)]
async fn test_restore_low_brightness_maps_to_first_level() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);
    lamp.restore_state(true, Some(26), Some(4000)).await.unwrap();

    let snapshot = lamp.snapshot().await;
    assert_eq!(snapshot.brightness_level(), Some(1));
    assert_eq!(snapshot.cct_level(), Some(2));

    lamp.set_brightness(255).await.unwrap();
    assert_eq!(transport.commands(), repeat(LampCommand::BrightnessUp, 9));
}

#[tokio::test(start_paused = true)]
async fn test_color_temp_clamped_before_mapping() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport);
    lamp.restore_state(true, None, None).await.unwrap();

    let state = lamp.set_color_temp(1000).await.unwrap();

    assert!(transport.commands().is_empty());
    assert_eq!(state.color_temp_kelvin, Some(2700));
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_targets_ignored_on_turn_on() {
    let transport = RecordingTransport::new();
    let lamp = controller(switch_lamp(), &transport);

    let state = lamp
        .turn_on(
            TurnOnRequest::new()
                .with_brightness(128)
                .with_color_temp(4000),
        )
        .await
        .unwrap();

    assert_eq!(transport.commands(), vec![LampCommand::Toggle]);
    assert_eq!(state.power, PowerState::On);
    assert_eq!(state.brightness, None);
    assert_eq!(state.color_temp_kelvin, None);
}

#[tokio::test(start_paused = true)]
async fn test_direct_adjustment_on_unsupported_axis() {
    let transport = RecordingTransport::new();
    let lamp = controller(dimmer(), &transport);
    lamp.turn_on(TurnOnRequest::new()).await.unwrap();
    transport.clear();

    let err = lamp.set_color_temp(4000).await.unwrap_err();
    assert!(matches!(err, LampError::Core(CoreError::InvalidTarget(_))));
    assert!(transport.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_direct_adjustment_while_off() {
    let transport = RecordingTransport::new();
    let lamp = controller(dimmer(), &transport);

    let err = lamp.set_brightness(128).await.unwrap_err();

    assert!(matches!(err, LampError::PoweredOff(_)));
    assert!(transport.commands().is_empty());
    assert_eq!(lamp.snapshot().await.brightness_level(), Some(10));
}

#[tokio::test(start_paused = true)]
async fn test_failed_toggle_leaves_lamp_off() {
    let transport = RecordingTransport::failing_on(0);
    let lamp = controller(desk_lamp(), &transport);

    let err = lamp
        .turn_on(TurnOnRequest::new().with_brightness(128))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    let snapshot = lamp.snapshot().await;
    assert!(!snapshot.is_on());
    assert_eq!(snapshot.brightness_level(), Some(10));
}

#[tokio::test(start_paused = true)]
async fn test_failure_mid_sequence_keeps_previous_level() {
    // toggle and one step go out, the second step fails
    let transport = RecordingTransport::failing_on(2);
    let lamp = controller(desk_lamp(), &transport);

    let err = lamp
        .turn_on(TurnOnRequest::new().with_brightness(128))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(
        transport.commands(),
        vec![LampCommand::Toggle, LampCommand::BrightnessDown]
    );
    let snapshot = lamp.snapshot().await;
    assert!(snapshot.is_on());
    assert_eq!(snapshot.brightness_level(), Some(10));
}

#[tokio::test(start_paused = true)]
async fn test_failure_on_second_axis_keeps_first() {
    // toggle and four brightness steps succeed, the first color step fails
    let transport = RecordingTransport::failing_on(5);
    let lamp = controller(desk_lamp(), &transport);

    let result = lamp
        .turn_on(
            TurnOnRequest::new()
                .with_brightness(128)
                .with_color_temp(6500),
        )
        .await;

    assert!(result.is_err());
    let snapshot = lamp.snapshot().await;
    assert_eq!(snapshot.brightness_level(), Some(6));
    assert_eq!(snapshot.cct_level(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_operations_do_not_interleave() {
    let transport = RecordingTransport::new();
    let lamp = Arc::new(controller(desk_lamp(), &transport));

    let first = {
        let lamp = lamp.clone();
        tokio::spawn(async move {
            lamp.turn_on(TurnOnRequest::new().with_brightness(128))
                .await
        })
    };
    // Let the first operation take the lock
    tokio::task::yield_now().await;

    let second = {
        let lamp = lamp.clone();
        tokio::spawn(async move {
            lamp.turn_on(TurnOnRequest::new().with_color_temp(6500))
                .await
        })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let mut expected = vec![LampCommand::Toggle];
    expected.extend(repeat(LampCommand::BrightnessDown, 4));
    expected.extend(repeat(LampCommand::CctToggle, 3));
    assert_eq!(transport.commands(), expected);
    assert!(transport.gaps().iter().all(|gap| *gap >= PACING));
}

#[tokio::test(start_paused = true)]
async fn test_lamps_are_paced_independently() {
    let transport = RecordingTransport::new();
    let desk = controller(desk_lamp(), &transport);
    let hall = controller(dimmer(), &transport);
    let request = TurnOnRequest::new().with_brightness(128);

    let start = Instant::now();
    let (a, b) = tokio::join!(desk.turn_on(request), hall.turn_on(request));
    a.unwrap();
    b.unwrap();

    // Each lamp needs four gaps; run side by side they overlap
    assert!(start.elapsed() < PACING * 8);
    assert_eq!(transport.commands().len(), 10);

    let desk_target = transport
        .sent()
        .into_iter()
        .filter(|s| s.target.device_name == "desk")
        .count();
    assert_eq!(desk_target, 5);
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval() {
    let transport = RecordingTransport::new();
    let lamp = controller(desk_lamp(), &transport).with_command_interval(Duration::from_millis(500));

    lamp.turn_on(TurnOnRequest::new().with_brightness(128))
        .await
        .unwrap();

    assert!(
        transport
            .gaps()
            .iter()
            .all(|gap| *gap >= Duration::from_millis(500))
    );
}
