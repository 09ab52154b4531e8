use wam_rt::ring::EventRingBuffer;
use wam_rt::{
    CurveType, EngineBuilder, EngineConfig, Event, MidiEvent, ParamChange, ParamIndex,
    ParameterInfo,
};

fn step(timestamp: u32) -> Event {
    Event::param_change(timestamp, ParamChange::step(ParamIndex::new(0), timestamp as f32))
}

#[test]
fn drains_events_by_deadline_across_two_quanta() {
    let (mut tx, mut rx) = EventRingBuffer::new(1024).unwrap();
    for i in 0..10 {
        tx.write(&step(i * 10)).unwrap();
    }

    let mut out = Vec::new();
    assert_eq!(rx.read_all_due_by(50, &mut out), 6);
    let stamps: Vec<u32> = out.iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps, [0, 10, 20, 30, 40, 50]);

    out.clear();
    assert_eq!(rx.read_all_due_by(100, &mut out), 4);
    let stamps: Vec<u32> = out.iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps, [60, 70, 80, 90]);
    assert!(rx.is_empty());
}

#[test]
fn automation_renders_sample_accurately() {
    let (mut controller, mut processor) = EngineBuilder::new()
        .config(EngineConfig::default().with_max_block_size(128))
        .parameter(ParameterInfo::new("gain", 0.0, 1.0, 0.0))
        .build()
        .unwrap();
    let gain = controller.registry().resolve("gain").unwrap();

    // 0 → 1 over 128 samples, overridden back to 0 halfway through.
    controller
        .schedule_parameter_change("gain", 1.0, 128, 0)
        .unwrap();
    controller
        .schedule_parameter_change("gain", 0.0, 128, 64)
        .unwrap();

    let mut rendered = Vec::new();
    for quantum in 0..3u64 {
        processor.on_render_quantum(64, quantum * 64);
        rendered.extend_from_slice(processor.values(gain));
    }

    assert_eq!(rendered.len(), 192);
    assert!(rendered[..64].windows(2).all(|w| w[1] >= w[0]));
    assert!((rendered[63] - 0.5).abs() < 1e-6);
    assert!((rendered[64] - rendered[63]).abs() <= 1.0 / 128.0 + 1e-6);
    assert!(rendered[64..].windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(rendered[191], 0.0);
    assert!(rendered.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn exponential_sweep_stays_in_range_and_lands() {
    let (mut controller, mut processor) = EngineBuilder::new()
        .parameter(
            ParameterInfo::new("cutoff", 20.0, 20_000.0, 100.0).with_curve(CurveType::Exponential),
        )
        .build()
        .unwrap();
    let cutoff = controller.registry().resolve("cutoff").unwrap();

    controller
        .schedule_parameter_change("cutoff", 10_000.0, 1_000, 10)
        .unwrap();

    let mut last = 0.0;
    for quantum in 0..10u64 {
        processor.on_render_quantum(128, quantum * 128);
        for &v in processor.values(cutoff) {
            assert!((20.0..=20_000.0).contains(&v));
            assert!(v >= last);
            last = v;
        }
    }
    assert_eq!(last, 10_000.0);
}

#[test]
fn midi_is_delivered_in_offset_order_with_parameters() {
    let (mut controller, mut processor) = EngineBuilder::new()
        .parameter(ParameterInfo::int("octave", -2, 2, 0))
        .build()
        .unwrap();
    let octave = controller.registry().resolve("octave").unwrap();

    let note_off = MidiEvent::NoteOff {
        channel: 0,
        key: 64,
        velocity: 0,
    };
    let note_on = MidiEvent::NoteOn {
        channel: 0,
        key: 64,
        velocity: 80,
    };
    controller.send_midi(200, note_off).unwrap();
    controller.send_midi(140, note_on).unwrap();
    controller
        .schedule_parameter_change("octave", 1.4, 500, 150)
        .unwrap();

    processor.on_render_quantum(128, 0);
    assert!(processor.events().is_empty());

    processor.on_render_quantum(128, 128);
    let offsets: Vec<usize> = processor.events().iter().map(|t| t.offset).collect();
    assert_eq!(offsets, [12, 72]);
    assert_eq!(processor.events()[0].event, Event::midi(140, note_on));

    // Integer parameters jump (and round) instead of ramping.
    let values = processor.values(octave);
    assert_eq!(values[21], 0.0);
    assert_eq!(values[22], 1.0);
    assert_eq!(processor.value(octave), Some(1.0));
}

#[test]
fn full_event_ring_rejects_without_corrupting() {
    let (mut controller, mut processor) = EngineBuilder::new()
        .config(EngineConfig::default().with_event_capacity(512))
        .parameter(ParameterInfo::new("gain", 0.0, 1.0, 0.0))
        .build()
        .unwrap();
    let gain = controller.registry().resolve("gain").unwrap();

    let mut accepted = 0;
    let mut last_accepted = 0.0;
    for i in 0..100 {
        let value = i as f32 / 100.0;
        if controller
            .schedule_parameter_change("gain", value, 0, 0)
            .is_ok()
        {
            accepted += 1;
            last_accepted = value;
        }
    }
    assert!(accepted > 0 && accepted < 100);
    assert_eq!(controller.rejected_events(), 100 - accepted);

    processor.on_render_quantum(64, 0);
    assert_eq!(processor.values(gain)[0], last_accepted);
}
