//! Benchmarks for the pre-send path
//!
//! This benchmark measures:
//! - Local validation of an Android notification
//! - Wire encoding for single and multi-token messages
//! - Duration formatting

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use hms_push::message::wire::encode_duration;
use hms_push::message::{ClickAction, LightSettings, NotificationBarStyle, PushMessage};
use hms_push::message::Color;

fn rich_message(tokens: usize) -> PushMessage {
    let tokens = (0..tokens).map(|i| format!("device-token-{:04}", i)).collect();
    let mut msg = PushMessage::android_notification(tokens, "Daily digest", "Three new stories for you");
    if let Some(n) = msg
        .message
        .android
        .as_mut()
        .and_then(|a| a.notification.as_mut())
    {
        n.style = Some(NotificationBarStyle::BigText);
        n.big_title = Some("Daily digest".into());
        n.big_body = Some("A longer body shown when the notification is expanded".into());
        n.color = Some("#1E88E5".into());
        n.click_action = Some(ClickAction::open_url("https://example.com/digest"));
        n.vibrate_config = vec![Duration::from_millis(250); 4];
        n.light_settings = Some(LightSettings {
            color: Some(Color::default()),
            light_on_duration: Some(Duration::from_secs_f64(3.5)),
            light_off_duration: Some(Duration::from_secs(5)),
        });
    }
    msg
}

fn bench_validate(c: &mut Criterion) {
    let msg = rich_message(1);
    c.bench_function("validate_android_notification", |b| {
        b.iter(|| black_box(&msg).validate())
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for tokens in [1usize, 100, 1000] {
        let msg = rich_message(tokens);
        group.throughput(Throughput::Elements(tokens as u64));
        group.bench_with_input(BenchmarkId::new("android", tokens), &msg, |b, msg| {
            b.iter(|| black_box(msg).encode())
        });
    }
    group.finish();
}

fn bench_duration(c: &mut Criterion) {
    c.bench_function("encode_duration", |b| {
        b.iter(|| encode_duration(black_box(Duration::from_millis(86_400_500))))
    });
}

criterion_group!(benches, bench_validate, bench_encode, bench_duration);
criterion_main!(benches);
