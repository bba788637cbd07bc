//! Integration tests for the bounded publish contract.
//!
//! One publisher serves every activity, so the overflow policy must come
//! out the same no matter which call site hits a full channel.

use embassy_time::{Duration, Timer};
use futures_lite::future::{block_on, zip};

use helirig::app::display::{Delivery, DisplayChannel, DisplayMessage, Publisher, DISPLAY_QUEUE_DEPTH};
use helirig::config::OverflowPolicy;
use helirig::error::ChannelError;
use helirig::Error;

fn fill(publisher: &Publisher<'_>) {
    for i in 0..DISPLAY_QUEUE_DEPTH {
        publisher.try_send(DisplayMessage::height(i as i32)).unwrap();
    }
}

#[test]
fn halt_policy_is_the_same_for_every_activity() {
    let channel = DisplayChannel::new();
    let publisher = Publisher::new(&channel, Duration::from_millis(3), OverflowPolicy::Halt);
    fill(&publisher);

    assert_eq!(
        block_on(publisher.publish(DisplayMessage::height(1), "height")),
        Err(Error::Halted("height"))
    );
    assert_eq!(
        block_on(publisher.publish(DisplayMessage::angle(1), "yaw")),
        Err(Error::Halted("yaw"))
    );
    assert_eq!(publisher.dropped(), 0);
}

#[test]
fn drop_policy_is_the_same_for_every_activity() {
    let channel = DisplayChannel::new();
    let publisher = Publisher::new(&channel, Duration::from_millis(3), OverflowPolicy::DropNewest);
    fill(&publisher);

    assert_eq!(
        block_on(publisher.publish(DisplayMessage::height(1), "height")),
        Ok(Delivery::Dropped)
    );
    assert_eq!(
        block_on(publisher.publish(DisplayMessage::angle(1), "yaw")),
        Ok(Delivery::Dropped)
    );
    assert_eq!(publisher.dropped(), 2);

    // the queued messages are the original ones, oldest first
    assert_eq!(channel.try_receive().unwrap(), DisplayMessage::height(0));
}

#[test]
fn zero_wait_and_bounded_wait_are_told_apart() {
    let channel = DisplayChannel::new();
    let publisher = Publisher::new(&channel, Duration::from_millis(3), OverflowPolicy::Halt);
    fill(&publisher);

    assert_eq!(publisher.try_send(DisplayMessage::angle(1)), Err(ChannelError::WouldBlock));
    assert_eq!(
        block_on(publisher.send_timeout(DisplayMessage::angle(1))),
        Err(ChannelError::Exhausted)
    );
}

#[test]
fn consumer_freeing_a_slot_within_the_wait_unblocks_publish() {
    let channel = DisplayChannel::new();
    let publisher = Publisher::new(&channel, Duration::from_millis(500), OverflowPolicy::Halt);
    fill(&publisher);

    let consumer = async {
        Timer::after(Duration::from_millis(5)).await;
        channel.receive().await
    };
    let (delivered, freed) = block_on(zip(publisher.publish(DisplayMessage::angle(7), "yaw"), consumer));

    assert_eq!(delivered, Ok(Delivery::Queued));
    assert_eq!(freed, DisplayMessage::height(0));
    assert_eq!(channel.len(), DISPLAY_QUEUE_DEPTH);
}
