#[cfg(test)]
mod tests {
    use crate::services::scheduler::{
        generate_radar, run_scheduler, RadarSchedule, ScheduleError, SchedulerExit,
    };
    use crate::services::triggers::{Trigger, TriggerChannel, TriggerError};
    use crate::tests::helpers::{CountingGenerator, FixedClock};

    const HOURS: [&str; 24] = [
        "00", "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14",
        "15", "16", "17", "18", "19", "20", "21", "22", "23",
    ];

    fn schedule(hour: &str) -> Result<RadarSchedule, ScheduleError> {
        RadarSchedule::new(hour, "token", "parkr/radar", "parkr")
    }

    /// Queues `triggers`, closes the channel and runs the loop to completion.
    async fn run_with(
        triggers: &[Trigger],
        schedule: Result<RadarSchedule, ScheduleError>,
        clock: FixedClock,
    ) -> (SchedulerExit, CountingGenerator) {
        let (channel, rx) = TriggerChannel::new(triggers.len().max(1));
        for t in triggers {
            channel.send(*t).unwrap();
        }
        channel.close();

        let generator = CountingGenerator::default();
        let exit = run_scheduler(rx, schedule, generator.clone(), clock).await;
        (exit, generator)
    }

    #[tokio::test]
    async fn test_tick_at_scheduled_hour_fires_once_per_event() {
        for hour in HOURS {
            let clock = FixedClock(hour);
            let (exit, generator) = run_with(
                &[Trigger::PeriodicTick, Trigger::PeriodicTick],
                schedule(hour),
                clock,
            )
            .await;

            assert_eq!(exit, SchedulerExit::Closed);
            assert_eq!(generator.count(), 2, "hour {hour}");
        }
    }

    #[tokio::test]
    async fn test_tick_at_other_hour_never_fires() {
        for (i, hour) in HOURS.iter().enumerate() {
            let other = HOURS[(i + 1) % HOURS.len()];
            let (exit, generator) =
                run_with(&[Trigger::PeriodicTick], schedule(hour), FixedClock(other)).await;

            assert_eq!(exit, SchedulerExit::Closed);
            assert_eq!(generator.count(), 0, "hour {hour} at {other}");
        }
    }

    #[tokio::test]
    async fn test_force_fires_regardless_of_hour() {
        for hour in HOURS {
            let (_, generator) =
                run_with(&[Trigger::ManualForce], schedule("03"), FixedClock(hour)).await;
            assert_eq!(generator.count(), 1, "clock at {hour}");
        }
    }

    #[tokio::test]
    async fn test_mixed_events_only_matching_fire() {
        let (_, generator) = run_with(
            &[
                Trigger::PeriodicTick,
                Trigger::ManualForce,
                Trigger::PeriodicTick,
            ],
            schedule("03"),
            FixedClock("17"),
        )
        .await;
        assert_eq!(generator.count(), 1);
    }

    #[tokio::test]
    async fn test_scenario_three_am_tick() {
        let (exit, generator) =
            run_with(&[Trigger::PeriodicTick], schedule("03"), FixedClock("03")).await;

        assert_eq!(exit, SchedulerExit::Closed);
        assert_eq!(generator.count(), 1);
    }

    #[tokio::test]
    async fn test_closed_channel_ends_loop_without_work() {
        let (exit, generator) = run_with(&[], schedule("03"), FixedClock("03")).await;

        assert_eq!(exit, SchedulerExit::Closed);
        assert_eq!(generator.count(), 0);
    }

    #[tokio::test]
    async fn test_loop_exits_when_closed_while_waiting() {
        let (channel, rx) = TriggerChannel::new(1);
        let generator = CountingGenerator::default();
        let task = tokio::spawn(run_scheduler(
            rx,
            schedule("03"),
            generator.clone(),
            FixedClock("03"),
        ));

        tokio::task::yield_now().await;
        channel.close();

        assert_eq!(task.await.unwrap(), SchedulerExit::Closed);
        assert_eq!(channel.send(Trigger::ManualForce), Err(TriggerError::Closed));
        assert_eq!(generator.count(), 0);
    }

    #[tokio::test]
    async fn test_single_digit_hour_disables_generation() {
        let (exit, generator) = run_with(
            &[Trigger::PeriodicTick, Trigger::ManualForce],
            schedule("3"),
            FixedClock("03"),
        )
        .await;

        assert_eq!(exit, SchedulerExit::Disabled);
        assert_eq!(generator.count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_hour_still_accepts_force() {
        let (exit, generator) = run_with(
            &[Trigger::ManualForce, Trigger::PeriodicTick],
            schedule("24"),
            FixedClock("23"),
        )
        .await;

        assert_eq!(exit, SchedulerExit::Closed);
        assert_eq!(generator.count(), 1);
    }

    #[tokio::test]
    async fn test_missing_repo_disables_force() {
        let missing = RadarSchedule::new("03", "token", "", "");
        assert_eq!(missing, Err(ScheduleError::MissingRepo));

        let (exit, generator) =
            run_with(&[Trigger::ManualForce], missing, FixedClock("03")).await;

        assert_eq!(exit, SchedulerExit::Disabled);
        assert_eq!(generator.count(), 0);
    }

    #[tokio::test]
    async fn test_missing_token_disables_force() {
        let missing = RadarSchedule::new("03", "", "parkr/radar", "");
        let (exit, generator) =
            run_with(&[Trigger::ManualForce], missing, FixedClock("12")).await;

        assert_eq!(exit, SchedulerExit::Disabled);
        assert_eq!(generator.count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_scheduler_drops_receiver() {
        let (channel, rx) = TriggerChannel::new(1);
        let exit = run_scheduler(
            rx,
            schedule("x"),
            CountingGenerator::default(),
            FixedClock("03"),
        )
        .await;

        assert_eq!(exit, SchedulerExit::Disabled);
        assert_eq!(
            channel.send(Trigger::ManualForce),
            Err(TriggerError::Disconnected)
        );
    }

    #[tokio::test]
    async fn test_failure_is_not_retried_and_loop_continues() {
        let (channel, rx) = TriggerChannel::new(2);
        channel.send(Trigger::ManualForce).unwrap();
        channel.send(Trigger::ManualForce).unwrap();
        channel.close();

        let generator = CountingGenerator::failing();
        let exit = run_scheduler(rx, schedule("03"), generator.clone(), FixedClock("10")).await;

        assert_eq!(exit, SchedulerExit::Closed);
        assert_eq!(generator.count(), 2);
    }

    #[tokio::test]
    async fn test_generate_radar_reports_location() {
        let generator = CountingGenerator::default();
        let url = generate_radar(&generator).await;
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/parkr/radar/issues/1")
        );

        let failing = CountingGenerator::failing();
        assert!(generate_radar(&failing).await.is_none());
    }
}
