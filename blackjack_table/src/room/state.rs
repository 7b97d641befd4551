//! The room state machine.
//!
//! A [`Room`] owns six seats, the spectator list, the dealer and the deck,
//! and drives rounds through
//! `IDLE -> STARTING -> BETTING -> DEALING_CARDS -> PLAYING -> END -> STARTING`.
//!
//! The room never sleeps. Every state that waits arms a single [`Wakeup`]
//! and the owner (normally the room actor) calls [`Room::fire`] with the
//! wakeup's generation once its delay has elapsed. Arming bumps the
//! generation, so a wakeup that was superseded by a manual action fires
//! into a no-op.
//!
//! Every externally visible mutation queues a [`RoomEvent`] which the owner
//! drains with [`Room::drain_events`] and fans out to subscribers.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration};

use super::{
    config::RoomConfig,
    errors::{RoomError, RoomResult},
    messages::{Cause, Command, RoomEvent, RoomSnapshot, SpectatorView},
};
use crate::{
    accounts::{AccountService, EntryType, RoomId, UserProfile},
    game::{
        constants::MAX_SEATS,
        entities::{
            BetAmount, Dealer, DealerView, Deck, DeckSource, Player, PlayerStatus, PlayerView,
            Seat, UserId,
        },
        functional,
    },
};

/// Room lifecycle status
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[default]
    Idle,
    Starting,
    Betting,
    DealingCards,
    Playing,
    End,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            RoomStatus::Idle => "IDLE",
            RoomStatus::Starting => "STARTING",
            RoomStatus::Betting => "BETTING",
            RoomStatus::DealingCards => "DEALING_CARDS",
            RoomStatus::Playing => "PLAYING",
            RoomStatus::End => "END",
        };
        write!(f, "{repr}")
    }
}

/// What an armed wakeup does when it fires
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WakeupKind {
    /// One-second tick of the starting countdown or a turn timer
    Countdown,
    /// Deal the next card, or move on once every hand holds two
    DealNext,
    /// Dealer draws, or stops at the stand threshold
    DealerDraw,
    Settle,
    Restart,
}

/// The single pending timer of a room
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Wakeup {
    pub generation: u64,
    pub kind: WakeupKind,
    pub after: Duration,
}

#[derive(Clone, Debug)]
struct Spectator {
    profile: UserProfile,
    online: bool,
}

/// Who receives the next card while dealing
#[derive(Clone, Copy, Debug)]
enum Receiver {
    Seat(usize),
    Dealer,
}

/// A shared blackjack room
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    status: RoomStatus,
    round: u64,
    seats: [Option<Player>; MAX_SEATS],
    spectators: BTreeMap<UserId, Spectator>,
    starts_in: Option<u32>,
    turn_ends_in: Option<u32>,
    turn_player: Option<UserId>,
    dealer: Dealer,
    deck: Deck,
    decks: Box<dyn DeckSource>,
    accounts: Arc<dyn AccountService>,
    generation: u64,
    wakeup: Option<Wakeup>,
    deal_cursor: usize,
    events: Vec<RoomEvent>,
}

impl Room {
    pub fn new(
        id: RoomId,
        config: RoomConfig,
        accounts: Arc<dyn AccountService>,
        decks: Box<dyn DeckSource>,
    ) -> Self {
        Self {
            id,
            config,
            status: RoomStatus::Idle,
            round: 0,
            seats: Default::default(),
            spectators: BTreeMap::new(),
            starts_in: None,
            turn_ends_in: None,
            turn_player: None,
            dealer: Dealer::new(),
            deck: Deck::stacked(Vec::new()),
            decks,
            accounts,
            generation: 0,
            wakeup: None,
            deal_cursor: 0,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    /// Number of rounds started so far
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn starts_in(&self) -> Option<u32> {
        self.starts_in
    }

    pub fn turn_ends_in(&self) -> Option<u32> {
        self.turn_ends_in
    }

    pub fn turn_player(&self) -> Option<UserId> {
        self.turn_player
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn player(&self, user_id: UserId) -> Option<&Player> {
        self.seats.iter().flatten().find(|p| p.id == user_id)
    }

    pub fn seat(&self, seat: Seat) -> Option<&Player> {
        self.seats[seat.index()].as_ref()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.seats.iter().flatten()
    }

    pub fn is_spectator(&self, user_id: UserId) -> bool {
        self.spectators.contains_key(&user_id)
    }

    pub fn spectator_count(&self) -> usize {
        self.spectators.len()
    }

    /// The currently armed wakeup, if any
    pub fn wakeup(&self) -> Option<Wakeup> {
        self.wakeup
    }

    /// Take every event queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<RoomEvent> {
        std::mem::take(&mut self.events)
    }

    /// Public view of the room with hidden cards redacted
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            status: self.status,
            round: self.round,
            dealer: DealerView::from(&self.dealer),
            seats: self
                .seats
                .iter()
                .map(|seat| seat.as_ref().map(PlayerView::from))
                .collect(),
            spectators: self
                .spectators
                .values()
                .map(|s| SpectatorView {
                    id: s.profile.id,
                    name: s.profile.name.clone(),
                    avatar: s.profile.avatar.clone(),
                    online: s.online,
                })
                .collect(),
            starts_in: self.starts_in,
            turn_ends_in: self.turn_ends_in,
            turn_player: self.turn_player,
        }
    }

    // === Commands ===

    /// Enter the room as a spectator. Seated users and existing spectators
    /// are only marked online.
    pub fn join(&mut self, profile: UserProfile) {
        if self.player(profile.id).is_some() || self.spectators.contains_key(&profile.id) {
            self.set_online(profile.id, true);
            return;
        }

        log::info!("Room {}: {} joined as spectator", self.id, profile.name);
        self.spectators.insert(
            profile.id,
            Spectator {
                profile,
                online: true,
            },
        );
        self.emit(None);
    }

    /// Mark a user online or offline. Returns false for unknown users.
    pub fn set_online(&mut self, user_id: UserId, online: bool) -> bool {
        let changed = if let Some(player) = self.player_mut(user_id) {
            std::mem::replace(&mut player.online, online) != online
        } else if let Some(spectator) = self.spectators.get_mut(&user_id) {
            std::mem::replace(&mut spectator.online, online) != online
        } else {
            return false;
        };

        if changed {
            log::debug!(
                "Room {}: user {} is now {}",
                self.id,
                user_id,
                if online { "online" } else { "offline" }
            );
            self.emit(None);
        }
        true
    }

    /// Route a validated command to its handler
    pub async fn apply(&mut self, command: Command) -> RoomResult<()> {
        match command {
            Command::PickSeat { user_id, seat } => self.pick_seat(user_id, seat).await,
            Command::PlaceBet { player_id, amount } => self.place_bet(player_id, amount).await,
            Command::Hit { player_id } => self.hit(player_id).await,
            Command::Stand { player_id } => self.stand(player_id),
        }
    }

    /// Move a spectator into a free seat
    ///
    /// # Errors
    ///
    /// * `RoomError::NotInRoom` - User has not joined this room
    /// * `RoomError::SeatTaken` - Another player holds the seat
    /// * `RoomError::Account` - Unknown user or seated in another room
    pub async fn pick_seat(&mut self, user_id: UserId, seat: Seat) -> RoomResult<()> {
        if self.player(user_id).is_some() {
            return Ok(());
        }
        let spectator = self
            .spectators
            .get(&user_id)
            .cloned()
            .ok_or(RoomError::NotInRoom)?;
        if self.seats[seat.index()].is_some() {
            return Err(RoomError::SeatTaken(seat));
        }

        let balance = self.accounts.balance(user_id).await?;
        self.accounts.claim_seat(user_id, &self.id).await?;
        self.spectators.remove(&user_id);

        let mut player = Player::new(
            user_id,
            seat,
            spectator.profile.name,
            spectator.profile.avatar,
            balance,
        );
        player.online = spectator.online;
        if matches!(
            self.status,
            RoomStatus::DealingCards | RoomStatus::Playing | RoomStatus::End
        ) {
            player.sitting_out = true;
            player.played = true;
        }
        log::info!(
            "Room {}: {} took seat {}{}",
            self.id,
            player.name,
            seat,
            if player.sitting_out {
                " (sitting out this round)"
            } else {
                ""
            }
        );
        self.seats[seat.index()] = Some(player);

        if self.status == RoomStatus::Idle {
            self.start_round(None);
        } else {
            self.emit(None);
        }
        Ok(())
    }

    /// Place the turn player's bet and hand the turn on
    pub async fn place_bet(&mut self, player_id: UserId, amount: BetAmount) -> RoomResult<()> {
        self.expect_turn(player_id, RoomStatus::Betting, "bet")?;

        let balance = self
            .accounts
            .debit(player_id, &self.id, amount.chips(), EntryType::Bet)
            .await?;
        if let Some(player) = self.player_mut(player_id) {
            player.bet = amount.chips();
            player.balance = balance;
        }
        log::info!("Room {}: {} bet {}", self.id, player_id, amount);

        self.next_bettor();
        Ok(())
    }

    /// Deal one card to the turn player
    pub async fn hit(&mut self, player_id: UserId) -> RoomResult<()> {
        self.expect_turn(player_id, RoomStatus::Playing, "hit")?;

        let card = match self.deck.draw() {
            Ok(card) => card,
            Err(err) => {
                log::warn!("Room {}: {} on hit", self.id, err);
                self.abort_round().await;
                return Err(RoomError::DeckExhausted);
            }
        };

        let player = self.player_mut(player_id).ok_or(RoomError::NotInRoom)?;
        player.deal_card(card);
        let finished = player.status != PlayerStatus::Idle;
        if finished {
            player.played = true;
        }
        self.emit(Some(Cause::DealCard));

        if finished {
            self.next_turn();
        }
        Ok(())
    }

    /// End the turn player's turn
    pub fn stand(&mut self, player_id: UserId) -> RoomResult<()> {
        self.expect_turn(player_id, RoomStatus::Playing, "stand")?;

        if let Some(player) = self.player_mut(player_id) {
            player.played = true;
        }
        self.next_turn();
        Ok(())
    }

    /// Refund open bets, release every seat and stop all timers
    pub async fn close(&mut self) {
        self.disarm();
        self.refund_bets().await;

        let accounts = Arc::clone(&self.accounts);
        for player in self.seats.iter().flatten() {
            if let Err(err) = accounts.release_seat(player.id).await {
                log::error!(
                    "Room {}: failed to release seat of {}: {}",
                    self.id,
                    player.id,
                    err
                );
            }
        }

        self.seats = Default::default();
        self.status = RoomStatus::Idle;
        self.starts_in = None;
        self.turn_ends_in = None;
        self.turn_player = None;
        log::info!("Room {} closed after {} rounds", self.id, self.round);
    }

    // === Timers ===

    /// Run the armed wakeup if `generation` is still current
    ///
    /// # Returns
    ///
    /// * `bool` - false when the wakeup was superseded
    pub async fn fire(&mut self, generation: u64) -> bool {
        let Some(wakeup) = self.wakeup.filter(|w| w.generation == generation) else {
            log::debug!(
                "Room {}: ignoring stale wakeup {} (current {})",
                self.id,
                generation,
                self.generation
            );
            return false;
        };
        self.wakeup = None;

        match wakeup.kind {
            WakeupKind::Countdown => self.countdown_tick(),
            WakeupKind::DealNext => self.deal_next().await,
            WakeupKind::DealerDraw => self.dealer_draw().await,
            WakeupKind::Settle => self.settle().await,
            WakeupKind::Restart => self.start_round(None),
        }
        true
    }

    fn arm(&mut self, kind: WakeupKind, after: Duration) {
        self.generation += 1;
        self.wakeup = Some(Wakeup {
            generation: self.generation,
            kind,
            after,
        });
    }

    fn disarm(&mut self) {
        self.generation += 1;
        self.wakeup = None;
    }

    fn countdown_tick(&mut self) {
        let tick = self.config.tick();
        match self.status {
            RoomStatus::Starting => match self.starts_in.map(|s| s.saturating_sub(1)) {
                Some(left) if left > 0 => {
                    self.starts_in = Some(left);
                    self.arm(WakeupKind::Countdown, tick);
                    self.emit(None);
                }
                _ => {
                    self.starts_in = None;
                    self.status = RoomStatus::Betting;
                    log::info!("Room {}: betting open", self.id);
                    self.next_bettor();
                }
            },
            RoomStatus::Betting | RoomStatus::Playing => {
                match self.turn_ends_in.map(|s| s.saturating_sub(1)) {
                    Some(left) if left > 0 => {
                        self.turn_ends_in = Some(left);
                        self.arm(WakeupKind::Countdown, tick);
                        self.emit(None);
                    }
                    _ => self.expire_turn(),
                }
            }
            status => log::debug!("Room {}: countdown tick in {}", self.id, status),
        }
    }

    /// The turn timer ran out: a bettor sits the round out, a player stands
    fn expire_turn(&mut self) {
        let status = self.status;
        let Some(player) = self
            .turn_player
            .and_then(|id| self.seats.iter_mut().flatten().find(|p| p.id == id))
        else {
            return;
        };

        player.played = true;
        if status == RoomStatus::Betting {
            player.sitting_out = true;
            log::info!("Room {}: {} did not bet in time", self.id, player.name);
            self.next_bettor();
        } else {
            log::info!("Room {}: {} stands on timeout", self.id, player.name);
            self.next_turn();
        }
    }

    // === Round flow ===

    fn start_round(&mut self, cause: Option<Cause>) {
        self.turn_player = None;
        self.turn_ends_in = None;
        self.deal_cursor = 0;
        self.dealer.reset();
        for player in self.seats.iter_mut().flatten() {
            player.reset();
        }

        if self.players().next().is_none() {
            self.status = RoomStatus::Idle;
            self.starts_in = None;
            self.disarm();
            self.emit(cause);
            return;
        }

        self.round += 1;
        self.deck = self.decks.fresh_deck();
        self.status = RoomStatus::Starting;
        self.starts_in = Some(self.config.starting_countdown_secs);
        self.arm(WakeupKind::Countdown, self.config.tick());
        log::info!("Room {}: round {} starting", self.id, self.round);
        self.emit(cause);
    }

    /// Give the betting turn to the lowest seat that still owes a bet
    fn next_bettor(&mut self) {
        self.turn_player = None;
        self.turn_ends_in = None;

        let next = self
            .players()
            .find(|p| p.bet == 0 && !p.sitting_out)
            .map(|p| p.id);
        match next {
            Some(id) => {
                self.turn_player = Some(id);
                self.turn_ends_in = Some(self.config.betting_turn_secs);
                self.arm(WakeupKind::Countdown, self.config.tick());
                self.emit(None);
            }
            None => self.start_dealing(),
        }
    }

    fn start_dealing(&mut self) {
        self.status = RoomStatus::DealingCards;
        self.deal_cursor = 0;
        for player in self.seats.iter_mut().flatten() {
            if !player.in_round() {
                player.sitting_out = true;
                player.played = true;
            }
        }
        log::info!(
            "Room {}: dealing to {} players",
            self.id,
            self.players().filter(|p| p.in_round()).count()
        );
        self.arm(WakeupKind::DealNext, self.config.deal_interval());
        self.emit(None);
    }

    fn receivers(&self) -> Vec<Receiver> {
        let mut receivers: Vec<Receiver> = self
            .seats
            .iter()
            .enumerate()
            .filter(|(_, seat)| seat.as_ref().is_some_and(Player::in_round))
            .map(|(idx, _)| Receiver::Seat(idx))
            .collect();
        receivers.push(Receiver::Dealer);
        receivers
    }

    fn hand_len(&self, receiver: Receiver) -> usize {
        match receiver {
            Receiver::Seat(idx) => self.seats[idx].as_ref().map_or(0, |p| p.cards.len()),
            Receiver::Dealer => self.dealer.cards.len(),
        }
    }

    /// One card per call, round-robin over players in seat order then the
    /// dealer. The call after the last card opens play.
    async fn deal_next(&mut self) {
        let receivers = self.receivers();
        if receivers.iter().all(|&r| self.hand_len(r) >= 2) {
            self.status = RoomStatus::Playing;
            log::info!("Room {}: play begins", self.id);
            self.next_turn();
            return;
        }

        let card = match self.deck.draw() {
            Ok(card) => card,
            Err(err) => {
                log::warn!("Room {}: {} while dealing", self.id, err);
                self.abort_round().await;
                return;
            }
        };
        match receivers[self.deal_cursor % receivers.len()] {
            Receiver::Seat(idx) => {
                if let Some(player) = self.seats[idx].as_mut() {
                    player.deal_card(card);
                }
            }
            Receiver::Dealer => self.dealer.deal_card(card),
        }
        self.deal_cursor += 1;

        self.emit(Some(Cause::DealCard));
        self.arm(WakeupKind::DealNext, self.config.deal_interval());
    }

    /// Give the playing turn to the lowest seat that has not played.
    /// Hands that are already blackjack or bust have nothing to play.
    fn next_turn(&mut self) {
        self.turn_player = None;
        self.turn_ends_in = None;

        for player in self.seats.iter_mut().flatten() {
            if !player.played && player.status != PlayerStatus::Idle {
                player.played = true;
            }
        }

        let next = self.players().find(|p| !p.played).map(|p| p.id);
        match next {
            Some(id) => {
                self.turn_player = Some(id);
                self.turn_ends_in = Some(self.config.playing_turn_secs);
                self.arm(WakeupKind::Countdown, self.config.tick());
                self.emit(None);
            }
            None => self.enter_end(),
        }
    }

    fn enter_end(&mut self) {
        self.status = RoomStatus::End;
        self.turn_player = None;
        self.turn_ends_in = None;
        self.dealer.reveal_hole();
        log::info!(
            "Room {}: dealer reveals {} ({})",
            self.id,
            self.dealer.count,
            self.dealer.status
        );
        self.emit(Some(Cause::RevealHole));
        self.arm(WakeupKind::DealerDraw, self.config.reveal_delay());
    }

    async fn dealer_draw(&mut self) {
        if self.dealer.count >= self.config.dealer_stands_on {
            self.arm(WakeupKind::Settle, self.config.settle_delay());
            return;
        }

        match self.deck.draw() {
            Ok(card) => {
                self.dealer.deal_card(card);
                log::debug!("Room {}: dealer draws {}", self.id, card);
                self.emit(Some(Cause::DealCard));
                self.arm(WakeupKind::DealerDraw, self.config.dealer_draw_delay());
            }
            Err(err) => {
                log::warn!("Room {}: {} on dealer draw", self.id, err);
                self.abort_round().await;
            }
        }
    }

    /// Pay out every hand that had a bet riding, then schedule the next round
    async fn settle(&mut self) {
        let accounts = Arc::clone(&self.accounts);
        let (dealer_status, dealer_count) = (self.dealer.status, self.dealer.count);

        for player in self.seats.iter_mut().flatten().filter(|p| p.in_round()) {
            let settlement = functional::settle(
                player.status,
                player.count,
                dealer_status,
                dealer_count,
                player.bet,
            );
            player.status = settlement.outcome;
            player.bet = 0;

            if settlement.credit > 0 {
                match accounts
                    .credit(player.id, &self.id, settlement.credit, EntryType::Payout)
                    .await
                {
                    Ok(balance) => player.balance = balance,
                    Err(err) => log::error!(
                        "Room {}: payout of {} to {} failed: {}",
                        self.id,
                        settlement.credit,
                        player.id,
                        err
                    ),
                }
            }
            log::info!(
                "Room {}: {} {} with {} against {}",
                self.id,
                player.name,
                player.status,
                player.count,
                dealer_count
            );
        }

        self.emit(Some(Cause::Payout));
        self.arm(WakeupKind::Restart, self.config.restart_delay());
    }

    /// The deck ran dry: refund the round and start over
    async fn abort_round(&mut self) {
        log::warn!("Room {}: aborting round {}", self.id, self.round);
        self.refund_bets().await;
        self.start_round(Some(Cause::RoundAborted));
    }

    async fn refund_bets(&mut self) {
        let accounts = Arc::clone(&self.accounts);
        for player in self.seats.iter_mut().flatten().filter(|p| p.bet > 0) {
            match accounts
                .credit(player.id, &self.id, player.bet, EntryType::Refund)
                .await
            {
                Ok(balance) => player.balance = balance,
                Err(err) => log::error!(
                    "Room {}: refund of {} to {} failed: {}",
                    self.id,
                    player.bet,
                    player.id,
                    err
                ),
            }
            player.bet = 0;
        }
    }

    // === Helpers ===

    fn player_mut(&mut self, user_id: UserId) -> Option<&mut Player> {
        self.seats.iter_mut().flatten().find(|p| p.id == user_id)
    }

    fn expect_turn(
        &self,
        player_id: UserId,
        phase: RoomStatus,
        action: &'static str,
    ) -> RoomResult<()> {
        if self.player(player_id).is_none() {
            return Err(RoomError::NotInRoom);
        }
        if self.status != phase {
            return Err(RoomError::WrongPhase {
                action,
                status: self.status,
            });
        }
        if self.turn_player != Some(player_id) {
            return Err(RoomError::NotYourTurn);
        }
        Ok(())
    }

    fn emit(&mut self, cause: Option<Cause>) {
        let state = Arc::new(self.snapshot());
        self.events.push(RoomEvent { state, cause });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accounts::InMemoryAccounts,
        game::entities::{Card, Rank, StackedDecks, Suit},
    };

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Hearts)
    }

    fn room_with(decks: Vec<Deck>) -> (Room, Arc<InMemoryAccounts>) {
        let accounts = Arc::new(InMemoryAccounts::new(500));
        let room = Room::new(
            "abcde".to_string(),
            RoomConfig::default(),
            accounts.clone(),
            Box::new(StackedDecks::new(decks)),
        );
        (room, accounts)
    }

    async fn seat_user(room: &mut Room, accounts: &InMemoryAccounts, seat: u8) -> UserId {
        let user = accounts.create_user(&format!("p{seat}"), "fox").await;
        room.join(user.profile());
        room.pick_seat(user.id, Seat::try_from(seat).unwrap())
            .await
            .unwrap();
        user.id
    }

    /// Fire wakeups until the room leaves `status`
    async fn run_while(room: &mut Room, status: RoomStatus) {
        while room.status() == status {
            let wakeup = room.wakeup().expect("armed wakeup");
            assert!(room.fire(wakeup.generation).await);
        }
    }

    // === Seating Tests ===

    #[tokio::test]
    async fn test_first_seat_starts_round() {
        let (mut room, accounts) = room_with(vec![]);
        assert_eq!(room.status(), RoomStatus::Idle);

        let id = seat_user(&mut room, &accounts, 3).await;
        assert_eq!(room.status(), RoomStatus::Starting);
        assert_eq!(room.starts_in(), Some(10));
        assert_eq!(room.round(), 1);
        assert_eq!(room.seat(Seat::try_from(3).unwrap()).unwrap().id, id);
        assert!(!room.is_spectator(id));
        assert_eq!(room.wakeup().unwrap().kind, WakeupKind::Countdown);
    }

    #[tokio::test]
    async fn test_seat_taken_and_not_in_room() {
        let (mut room, accounts) = room_with(vec![]);
        seat_user(&mut room, &accounts, 1).await;
        room.drain_events();

        let other = accounts.create_user("other", "owl").await;
        let seat = Seat::try_from(1).unwrap();
        assert_eq!(
            room.pick_seat(other.id, seat).await,
            Err(RoomError::NotInRoom)
        );

        room.join(other.profile());
        room.drain_events();
        assert_eq!(
            room.pick_seat(other.id, seat).await,
            Err(RoomError::SeatTaken(seat))
        );
        assert!(room.drain_events().is_empty());
        assert!(room.is_spectator(other.id));
    }

    #[tokio::test]
    async fn test_repeat_pick_seat_is_noop() {
        let (mut room, accounts) = room_with(vec![]);
        let id = seat_user(&mut room, &accounts, 2).await;
        room.drain_events();

        room.pick_seat(id, Seat::try_from(5).unwrap()).await.unwrap();
        assert!(room.drain_events().is_empty());
        assert_eq!(room.player(id).unwrap().seat.number(), 2);
    }

    // === Timer Tests ===

    #[tokio::test]
    async fn test_stale_generation_is_noop() {
        let (mut room, accounts) = room_with(vec![]);
        seat_user(&mut room, &accounts, 1).await;
        let stale = room.wakeup().unwrap().generation;

        assert!(room.fire(stale).await);
        assert_eq!(room.starts_in(), Some(9));
        assert!(!room.fire(stale).await);
        assert_eq!(room.starts_in(), Some(9));
    }

    #[tokio::test]
    async fn test_countdown_opens_betting() {
        let (mut room, accounts) = room_with(vec![]);
        let id = seat_user(&mut room, &accounts, 1).await;

        for expected in (1..10).rev() {
            let wakeup = room.wakeup().unwrap();
            room.fire(wakeup.generation).await;
            assert_eq!(room.starts_in(), Some(expected));
        }
        let wakeup = room.wakeup().unwrap();
        room.fire(wakeup.generation).await;

        assert_eq!(room.status(), RoomStatus::Betting);
        assert_eq!(room.starts_in(), None);
        assert_eq!(room.turn_player(), Some(id));
        assert_eq!(room.turn_ends_in(), Some(30));
    }

    // === Betting Tests ===

    #[tokio::test]
    async fn test_bet_checks_phase_and_turn() {
        let (mut room, accounts) = room_with(vec![]);
        let first = seat_user(&mut room, &accounts, 1).await;
        let second = seat_user(&mut room, &accounts, 2).await;
        let amount = BetAmount::try_from(100).unwrap();

        assert!(matches!(
            room.place_bet(first, amount).await,
            Err(RoomError::WrongPhase { .. })
        ));

        run_while(&mut room, RoomStatus::Starting).await;
        room.drain_events();
        assert_eq!(
            room.place_bet(second, amount).await,
            Err(RoomError::NotYourTurn)
        );
        assert!(room.drain_events().is_empty());
        assert_eq!(accounts.balance(second).await.unwrap(), 500);

        room.place_bet(first, amount).await.unwrap();
        assert_eq!(room.player(first).unwrap().bet, 100);
        assert_eq!(room.player(first).unwrap().balance, 400);
        assert_eq!(room.turn_player(), Some(second));
    }

    #[tokio::test]
    async fn test_bet_over_balance_rejected() {
        let (mut room, accounts) = room_with(vec![]);
        let id = seat_user(&mut room, &accounts, 1).await;
        accounts
            .debit(id, "elsewhere", 490, EntryType::Bet)
            .await
            .unwrap();
        run_while(&mut room, RoomStatus::Starting).await;
        room.drain_events();

        let err = room
            .place_bet(id, BetAmount::try_from(25).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_invalid_action());
        assert_eq!(room.player(id).unwrap().bet, 0);
        assert_eq!(room.turn_player(), Some(id));
        assert!(room.drain_events().is_empty());
        assert_eq!(accounts.balance(id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_betting_timeout_sits_player_out() {
        let (mut room, accounts) = room_with(vec![]);
        let id = seat_user(&mut room, &accounts, 1).await;
        run_while(&mut room, RoomStatus::Starting).await;
        run_while(&mut room, RoomStatus::Betting).await;

        assert_eq!(room.status(), RoomStatus::DealingCards);
        let player = room.player(id).unwrap();
        assert!(player.sitting_out);
        assert_eq!(player.bet, 0);
    }

    // === Dealing Tests ===

    #[tokio::test]
    async fn test_hole_card_hidden_until_end() {
        let deck = Deck::stacked(vec![
            card(Rank::Ten),
            card(Rank::Nine),
            card(Rank::Seven),
            card(Rank::Eight),
        ]);
        let (mut room, accounts) = room_with(vec![deck]);
        let id = seat_user(&mut room, &accounts, 1).await;
        run_while(&mut room, RoomStatus::Starting).await;
        room.place_bet(id, BetAmount::try_from(25).unwrap())
            .await
            .unwrap();
        run_while(&mut room, RoomStatus::DealingCards).await;

        assert_eq!(room.status(), RoomStatus::Playing);
        let snapshot = room.snapshot();
        assert_eq!(snapshot.dealer.count, 9);
        assert!(!snapshot.dealer.cards[1].visible);
        assert_eq!(snapshot.dealer.cards[1].label, None);
        assert_eq!(snapshot.player(id).unwrap().count, 17);
    }
}
