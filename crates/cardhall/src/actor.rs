//! Game actor: an isolated Tokio task that owns one game end to end.
//!
//! Every mutating operation for a game — joins, bids, reveals,
//! timer-driven settlement, resets — flows through this actor's
//! command channel, which is what makes the game single-writer: while
//! one operation is in flight (including its store I/O) the next is
//! queued behind it, never interleaved. A bid racing the countdown is
//! resolved by whichever enters the queue first; the loser sees the
//! already-advanced auction and fails with `InvalidState`.

use std::collections::{HashMap, HashSet};

use cardhall_engine::{EngineError, NextStep, Settlement, DEFAULT_BID_WINDOW_MS};
use cardhall_protocol::{
    AuctionPhase, Card, CardAssignment, CardId, GameId, GameStatus, Player, PlayerId, Recipient,
    ServerEvent,
};
use cardhall_state::{GameSnapshot, StateCache};
use cardhall_store::GameStore;
use tokio::sync::{mpsc, oneshot};

use crate::error::CardhallError;
use crate::timer::{Countdown, TICK_INTERVAL_MS};

/// Channel sender for delivering events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Per-game tunables.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Soft-close bid window in milliseconds; every accepted bid
    /// resets the auction clock to this value.
    pub bid_window_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bid_window_ms: DEFAULT_BID_WINDOW_MS,
        }
    }
}

/// Commands sent to a game actor through its channel. The `oneshot`
/// sender in each variant is the reply channel the caller awaits.
pub(crate) enum GameCommand {
    Join {
        player: Player,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), CardhallError>>,
    },
    Ready {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), CardhallError>>,
    },
    Start {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), CardhallError>>,
    },
    PlaceBid {
        player_id: PlayerId,
        amount: u64,
        reply: oneshot::Sender<Result<(), CardhallError>>,
    },
    RevealCard {
        player_id: PlayerId,
        card_id: CardId,
        reply: oneshot::Sender<Result<(), CardhallError>>,
    },
    Reconnect {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), CardhallError>>,
    },
    /// Transient drop: the seat survives, only the channel goes away.
    Disconnect { player_id: PlayerId },
    /// Permanent departure (voluntary leave or expired grace period).
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), CardhallError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Result<GameSnapshot, CardhallError>>,
    },
    /// Restores the previous snapshot from the rollback history.
    Rollback {
        reply: oneshot::Sender<Result<bool, CardhallError>>,
    },
    Shutdown,
}

/// Handle to a running game actor. Cheap to clone; the manager keeps
/// one per game.
#[derive(Clone)]
pub struct GameHandle {
    game_id: GameId,
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, CardhallError>>) -> GameCommand,
    ) -> Result<T, CardhallError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| CardhallError::GameClosed(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| CardhallError::GameClosed(self.game_id))?
    }

    pub async fn join(&self, player: Player, sender: PlayerSender) -> Result<(), CardhallError> {
        self.request(|reply| GameCommand::Join { player, sender, reply }).await
    }

    pub async fn ready(&self, player_id: PlayerId) -> Result<(), CardhallError> {
        self.request(|reply| GameCommand::Ready { player_id, reply }).await
    }

    pub async fn start(&self, player_id: PlayerId) -> Result<(), CardhallError> {
        self.request(|reply| GameCommand::Start { player_id, reply }).await
    }

    pub async fn place_bid(&self, player_id: PlayerId, amount: u64) -> Result<(), CardhallError> {
        self.request(|reply| GameCommand::PlaceBid { player_id, amount, reply }).await
    }

    pub async fn reveal_card(
        &self,
        player_id: PlayerId,
        card_id: CardId,
    ) -> Result<(), CardhallError> {
        self.request(|reply| GameCommand::RevealCard { player_id, card_id, reply }).await
    }

    pub async fn reconnect(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), CardhallError> {
        self.request(|reply| GameCommand::Reconnect { player_id, sender, reply }).await
    }

    /// Fire-and-forget: a dropped connection should never block.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), CardhallError> {
        self.sender
            .send(GameCommand::Disconnect { player_id })
            .await
            .map_err(|_| CardhallError::GameClosed(self.game_id))
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), CardhallError> {
        self.request(|reply| GameCommand::Leave { player_id, reply }).await
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, CardhallError> {
        self.request(|reply| GameCommand::Snapshot { reply }).await
    }

    /// Rolls the game back one snapshot. Returns `false` when there is
    /// no prior snapshot to restore.
    pub async fn rollback(&self) -> Result<bool, CardhallError> {
        self.request(|reply| GameCommand::Rollback { reply }).await
    }

    pub async fn shutdown(&self) -> Result<(), CardhallError> {
        self.sender
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| CardhallError::GameClosed(self.game_id))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct GameActor<S: GameStore + Clone> {
    game_id: GameId,
    store: S,
    cache: StateCache<S>,
    config: GameConfig,
    /// Per-player outbound channels; absent while a player is dropped.
    senders: HashMap<PlayerId, PlayerSender>,
    ready: HashSet<PlayerId>,
    countdown: Countdown,
    receiver: mpsc::Receiver<GameCommand>,
}

impl<S: GameStore + Clone> GameActor<S> {
    async fn run(mut self) {
        tracing::info!(game_id = %self.game_id, "game actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(GameCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
                _ = self.countdown.tick() => {
                    if let Err(err) = self.handle_tick().await {
                        tracing::error!(game_id = %self.game_id, %err, "countdown handling failed");
                    }
                }
            }
        }

        tracing::info!(game_id = %self.game_id, "game actor stopped");
    }

    async fn handle_command(&mut self, cmd: GameCommand) {
        match cmd {
            GameCommand::Join { player, sender, reply } => {
                let player_id = player.id;
                let result = self.handle_join(player, sender).await;
                self.report(player_id, &result);
                let _ = reply.send(result);
            }
            GameCommand::Ready { player_id, reply } => {
                let result = self.handle_ready(player_id).await;
                self.report(player_id, &result);
                let _ = reply.send(result);
            }
            GameCommand::Start { player_id, reply } => {
                let result = self.handle_start(player_id).await;
                self.report(player_id, &result);
                let _ = reply.send(result);
            }
            GameCommand::PlaceBid { player_id, amount, reply } => {
                let result = self.handle_bid(player_id, amount).await;
                self.report(player_id, &result);
                let _ = reply.send(result);
            }
            GameCommand::RevealCard { player_id, card_id, reply } => {
                let result = self.handle_reveal(player_id, card_id).await;
                self.report(player_id, &result);
                let _ = reply.send(result);
            }
            GameCommand::Reconnect { player_id, sender, reply } => {
                let result = self.handle_reconnect(player_id, sender).await;
                self.report(player_id, &result);
                let _ = reply.send(result);
            }
            GameCommand::Disconnect { player_id } => {
                if let Err(err) = self.handle_disconnect(player_id).await {
                    tracing::warn!(game_id = %self.game_id, %player_id, %err, "disconnect handling failed");
                }
            }
            GameCommand::Leave { player_id, reply } => {
                let result = self.handle_leave(player_id).await;
                let _ = reply.send(result);
            }
            GameCommand::Snapshot { reply } => {
                let result = self
                    .cache
                    .recover(self.game_id)
                    .await
                    .map_err(CardhallError::from);
                let _ = reply.send(result);
            }
            GameCommand::Rollback { reply } => {
                let result = self.handle_rollback().await;
                let _ = reply.send(result);
            }
            GameCommand::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    /// Mirrors a failed request back to the originating player as an
    /// `error` event, so clients hear about rejections they caused.
    /// Integrity failures are excluded: the reset path already sent a
    /// `state_reset` notice.
    fn report(&self, player_id: PlayerId, result: &Result<(), CardhallError>) {
        match result {
            Ok(()) | Err(CardhallError::IntegrityFailure(_)) => {}
            Err(err) => {
                self.send_to(player_id, ServerEvent::Error { message: err.to_string() });
            }
        }
    }

    // ---------------------------------------------------------------------
    // Lobby
    // ---------------------------------------------------------------------

    async fn handle_join(
        &mut self,
        player: Player,
        sender: PlayerSender,
    ) -> Result<(), CardhallError> {
        let stored = self.store.load_game(self.game_id).await?;
        if stored.game.status != GameStatus::Waiting {
            return Err(EngineError::InvalidState {
                game: self.game_id,
                reason: "game already started".into(),
            }
            .into());
        }
        if stored.players.len() >= usize::from(stored.game.max_players) {
            return Err(EngineError::InvalidState {
                game: self.game_id,
                reason: "game is full".into(),
            }
            .into());
        }

        let nickname = player.nickname.clone();
        let player_id = player.id;
        self.store.add_player(self.game_id, player).await?;
        self.senders.insert(player_id, sender);

        let snapshot = self.cache.save(self.game_id).await?;
        self.dispatch(
            Recipient::AllExcept(player_id),
            ServerEvent::PlayerJoined { nickname },
        );
        self.send_to(
            player_id,
            ServerEvent::GameStateUpdated {
                game: snapshot.game,
                hands: snapshot.hands,
            },
        );
        Ok(())
    }

    async fn handle_ready(&mut self, player_id: PlayerId) -> Result<(), CardhallError> {
        let stored = self.store.load_game(self.game_id).await?;
        self.require_member(&stored.players, player_id)?;
        self.ready.insert(player_id);

        let all_ready = stored.players.len() >= 2
            && stored.players.iter().all(|p| self.ready.contains(&p.id));
        if stored.game.status == GameStatus::Waiting && all_ready {
            // The waiting-status guard inside setup makes this run once
            // even if two ready notifications race through the queue.
            self.begin_game().await?;
        }
        Ok(())
    }

    async fn handle_start(&mut self, player_id: PlayerId) -> Result<(), CardhallError> {
        let stored = self.store.load_game(self.game_id).await?;
        self.require_member(&stored.players, player_id)?;
        self.begin_game().await
    }

    /// The `waiting → dealing` transition plus the base deal: shuffle
    /// decks, draw winners, deal contiguous hands off deck 2 with the
    /// winning ids withheld, and open the auction over the leftovers.
    async fn begin_game(&mut self) -> Result<(), CardhallError> {
        let stored = self.store.load_game(self.game_id).await?;
        if stored.players.len() < 2 {
            return Err(EngineError::InvalidState {
                game: self.game_id,
                reason: "need at least 2 players to start".into(),
            }
            .into());
        }

        let catalog = self.store.list_all_cards().await?;
        let mut game = stored.game;
        cardhall_engine::setup_game(&mut game, &catalog)?;

        let winning: HashSet<CardId> = game
            .winning_cards
            .iter()
            .flat_map(|w| w.cards.iter().map(|c| c.id))
            .collect();
        let pool: Vec<Card> = game
            .deck2
            .iter()
            .filter(|c| !winning.contains(&c.id))
            .cloned()
            .collect();
        let dist = cardhall_engine::deal_hands(&pool, &stored.players)?;

        let rows: Vec<CardAssignment> = dist
            .hands
            .iter()
            .flat_map(|(player_id, cards)| {
                cards.iter().map(|c| CardAssignment {
                    game_id: self.game_id,
                    player_id: *player_id,
                    card_id: c.id,
                })
            })
            .collect();

        // After dealing, deck 2 holds only the cards routed to auction.
        game.deck2 = dist.leftovers.clone();
        game.auction = cardhall_engine::open_auction(dist.leftovers, self.config.bid_window_ms);
        if game.auction == AuctionPhase::Completed {
            // Nothing left to auction: the deal is the whole story.
            game.status = GameStatus::Active;
        }

        self.store.commit_assignments(&game, rows).await?;
        let snapshot = self.cache.save(self.game_id).await?;

        self.broadcast(ServerEvent::GameStarted { game: snapshot.game.clone() });
        self.broadcast(ServerEvent::GameStateUpdated {
            game: snapshot.game.clone(),
            hands: snapshot.hands,
        });
        if let AuctionPhase::Active { current_card, time_remaining_ms, .. } = &snapshot.game.auction
        {
            self.broadcast(ServerEvent::AuctionStarted {
                card: current_card.clone(),
                time_remaining: *time_remaining_ms,
            });
            self.countdown.start();
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Auction
    // ---------------------------------------------------------------------

    async fn handle_bid(&mut self, player_id: PlayerId, amount: u64) -> Result<(), CardhallError> {
        let stored = self.store.load_game(self.game_id).await?;
        self.require_member(&stored.players, player_id)?;

        let mut game = stored.game;
        cardhall_engine::place_bid(
            self.game_id,
            &mut game.auction,
            player_id,
            amount,
            self.config.bid_window_ms,
        )?;
        self.store.update_game(&game).await?;
        self.cache.save(self.game_id).await?;

        let nickname = nickname_of(&stored.players, player_id);
        self.broadcast(ServerEvent::BidPlaced { nickname, amount });
        self.broadcast(ServerEvent::TimerUpdated {
            time_remaining: self.config.bid_window_ms,
        });
        Ok(())
    }

    /// One second of auction clock. Broadcasts the countdown and, at
    /// zero, settles the card on the block through the same serialized
    /// path as every other mutation.
    async fn handle_tick(&mut self) -> Result<(), CardhallError> {
        let stored = self.store.load_game(self.game_id).await?;
        let mut game = stored.game;

        let Some(remaining) = cardhall_engine::tick(&mut game.auction, TICK_INTERVAL_MS) else {
            // No live auction. State-driven cancel; harmless if the
            // countdown was already stopped.
            self.countdown.cancel();
            return Ok(());
        };

        if remaining > 0 {
            self.store.update_game(&game).await?;
            self.cache.save(self.game_id).await?;
            self.broadcast(ServerEvent::TimerUpdated { time_remaining: remaining });
            return Ok(());
        }

        self.broadcast(ServerEvent::TimerUpdated { time_remaining: 0 });

        let (settlement, next) = cardhall_engine::settle_current_card(
            self.game_id,
            &mut game.auction,
            self.config.bid_window_ms,
        )?;

        match settlement {
            Settlement::Awarded { card, winner } => {
                let row = CardAssignment {
                    game_id: self.game_id,
                    player_id: winner,
                    card_id: card.id,
                };
                self.store.commit_assignments(&game, vec![row]).await?;
                self.broadcast(ServerEvent::AuctionEnded {
                    winner: Some(nickname_of(&stored.players, winner)),
                    card,
                });
            }
            Settlement::Unsold { card } => {
                self.store.update_game(&game).await?;
                self.broadcast(ServerEvent::AuctionEnded { winner: None, card });
            }
        }

        match next {
            NextStep::NextCard(card) => {
                self.cache.save(self.game_id).await?;
                self.broadcast(ServerEvent::AuctionStarted {
                    card,
                    time_remaining: self.config.bid_window_ms,
                });
            }
            NextStep::QueueEmpty { unsold } => {
                self.finish_dealing(unsold).await?;
            }
        }
        Ok(())
    }

    /// The auction queue is empty: route whatever went unsold through
    /// the fair random fallback, commit the batch atomically, and move
    /// the game to `active`.
    async fn finish_dealing(&mut self, unsold: Vec<Card>) -> Result<(), CardhallError> {
        let stored = self.store.load_game(self.game_id).await?;
        let mut game = stored.game;

        let players: Vec<PlayerId> = stored.players.iter().map(|p| p.id).collect();
        let mut counts: HashMap<PlayerId, usize> = HashMap::new();
        for row in &stored.assignments {
            *counts.entry(row.player_id).or_insert(0) += 1;
        }

        let rows: Vec<CardAssignment> =
            cardhall_engine::balance_leftovers(&players, &counts, unsold)?
                .into_iter()
                .map(|(player_id, card)| CardAssignment {
                    game_id: self.game_id,
                    player_id,
                    card_id: card.id,
                })
                .collect();

        game.auction = AuctionPhase::Completed;
        game.status = GameStatus::Active;
        self.store.commit_assignments(&game, rows).await?;
        let snapshot = self.cache.save(self.game_id).await?;

        self.countdown.cancel();
        self.broadcast(ServerEvent::GameStateUpdated {
            game: snapshot.game,
            hands: snapshot.hands,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Reveal
    // ---------------------------------------------------------------------

    async fn handle_reveal(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
    ) -> Result<(), CardhallError> {
        let snapshot = self.cache.recover(self.game_id).await?;
        let mut game = snapshot.game.clone();

        if game.status != GameStatus::Active {
            return Err(EngineError::InvalidState {
                game: self.game_id,
                reason: format!("reveal requires status active, game is {}", game.status),
            }
            .into());
        }
        let card = snapshot
            .hands
            .iter()
            .find(|h| h.player_id == player_id)
            .and_then(|h| h.cards.iter().find(|c| c.id == card_id))
            .cloned()
            .ok_or_else(|| EngineError::InvalidState {
                game: self.game_id,
                reason: format!("card {card_id} is not in the player's hand"),
            })?;
        if !game.revealed_cards.insert(card_id) {
            return Err(EngineError::InvalidState {
                game: self.game_id,
                reason: format!("card {card_id} was already revealed"),
            }
            .into());
        }
        game.current_turn += 1;

        let is_winner_card = game
            .winning_cards
            .as_ref()
            .is_some_and(|w| w.cards.iter().any(|c| c.id == card_id));
        let all_revealed = game.revealed_cards.len() >= snapshot.cards_owned();
        if all_revealed {
            game.status = GameStatus::Completed;
        }

        self.store.update_game(&game).await?;
        let snapshot = self.cache.save(self.game_id).await?;

        self.broadcast(ServerEvent::CardRevealed { card, is_winner_card });
        if all_revealed {
            self.broadcast(ServerEvent::GameStateUpdated {
                game: snapshot.game,
                hands: snapshot.hands,
            });
            // Completed games leave the cache for good.
            self.cache.evict(self.game_id);
            tracing::info!(game_id = %self.game_id, "game completed");
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Rollback
    // ---------------------------------------------------------------------

    /// Restores the previous snapshot and re-persists it. A rolled-back
    /// auction round resumes with its card, queue, and clock exactly as
    /// the restored snapshot recorded them.
    async fn handle_rollback(&mut self) -> Result<bool, CardhallError> {
        let Some(snapshot) = self.cache.rollback_to_last(self.game_id).await? else {
            return Ok(false);
        };

        if snapshot.game.auction.is_active() {
            self.countdown.start();
        } else {
            self.countdown.cancel();
        }
        tracing::warn!(game_id = %self.game_id, "game rolled back one snapshot");
        self.broadcast(ServerEvent::GameStateUpdated {
            game: snapshot.game,
            hands: snapshot.hands,
        });
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Presence
    // ---------------------------------------------------------------------

    async fn handle_reconnect(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), CardhallError> {
        self.senders.insert(player_id, sender);

        if !self.cache.validate(self.game_id).await? {
            if self.cache.handle_state_error(self.game_id).await? {
                self.countdown.cancel();
                self.ready.clear();
                self.broadcast(ServerEvent::StateReset {
                    message: "game state was corrupted and has been reset".into(),
                });
            }
            return Err(CardhallError::IntegrityFailure(self.game_id));
        }

        let snapshot = self.cache.recover(self.game_id).await?;
        let nickname = nickname_of(&snapshot.players, player_id);

        // Replay goes to the reconnecting player only; the room at
        // large just learns they are back.
        self.send_to(
            player_id,
            ServerEvent::GameStateUpdated {
                game: snapshot.game.clone(),
                hands: snapshot.hands.clone(),
            },
        );
        if let AuctionPhase::Active { current_card, time_remaining_ms, .. } = &snapshot.game.auction
        {
            self.send_to(
                player_id,
                ServerEvent::AuctionStarted {
                    card: current_card.clone(),
                    time_remaining: *time_remaining_ms,
                },
            );
        }
        for card_id in &snapshot.game.revealed_cards {
            let Some(card) = snapshot
                .hands
                .iter()
                .flat_map(|h| h.cards.iter())
                .find(|c| c.id == *card_id)
            else {
                continue;
            };
            let is_winner_card = snapshot
                .game
                .winning_cards
                .as_ref()
                .is_some_and(|w| w.cards.iter().any(|c| c.id == *card_id));
            self.send_to(
                player_id,
                ServerEvent::CardRevealed { card: card.clone(), is_winner_card },
            );
        }

        self.dispatch(
            Recipient::AllExcept(player_id),
            ServerEvent::PlayerReconnected { nickname },
        );
        Ok(())
    }

    async fn handle_disconnect(&mut self, player_id: PlayerId) -> Result<(), CardhallError> {
        self.senders.remove(&player_id);
        let stored = self.store.load_game(self.game_id).await?;
        let nickname = nickname_of(&stored.players, player_id);
        self.broadcast(ServerEvent::PlayerLeft { nickname, permanent: false });
        Ok(())
    }

    async fn handle_leave(&mut self, player_id: PlayerId) -> Result<(), CardhallError> {
        self.senders.remove(&player_id);
        self.ready.remove(&player_id);

        let stored = self.store.load_game(self.game_id).await?;
        let nickname = nickname_of(&stored.players, player_id);

        // In the lobby the seat is simply freed. Once cards are dealt
        // the roster row stays so the player's hand keeps an owner.
        if stored.game.status == GameStatus::Waiting {
            self.store.remove_player(self.game_id, player_id).await?;
            self.cache.save(self.game_id).await?;
        }

        self.broadcast(ServerEvent::PlayerLeft { nickname, permanent: true });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn require_member(
        &self,
        players: &[Player],
        player_id: PlayerId,
    ) -> Result<(), CardhallError> {
        if players.iter().any(|p| p.id == player_id) {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                game: self.game_id,
                reason: format!("player {player_id} is not in this game"),
            }
            .into())
        }
    }

    fn broadcast(&self, event: ServerEvent) {
        self.dispatch(Recipient::All, event);
    }

    fn dispatch(&self, recipient: Recipient, event: ServerEvent) {
        match recipient {
            Recipient::All => {
                for sender in self.senders.values() {
                    let _ = sender.send(event.clone());
                }
            }
            Recipient::Player(player_id) => self.send_to(player_id, event),
            Recipient::AllExcept(excluded) => {
                for (player_id, sender) in &self.senders {
                    if *player_id != excluded {
                        let _ = sender.send(event.clone());
                    }
                }
            }
        }
    }

    /// Silently drops the event if the player's channel is gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }
}

fn nickname_of(players: &[Player], player_id: PlayerId) -> String {
    players
        .iter()
        .find(|p| p.id == player_id)
        .map(|p| p.nickname.clone())
        .unwrap_or_else(|| player_id.to_string())
}

/// Spawns a game actor task and returns the handle for commanding it.
pub(crate) fn spawn_game<S: GameStore + Clone>(
    game_id: GameId,
    store: S,
    config: GameConfig,
    channel_size: usize,
) -> GameHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let actor = GameActor {
        game_id,
        cache: StateCache::new(store.clone()),
        store,
        config,
        senders: HashMap::new(),
        ready: HashSet::new(),
        countdown: Countdown::idle(),
        receiver: rx,
    };
    tokio::spawn(actor.run());
    GameHandle { game_id, sender: tx }
}
