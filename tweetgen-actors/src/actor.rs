use anyhow::Result;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

/// Minimal actor trait. `Self: Sized` avoids object-safety issues when using `Context<Self>`.
#[async_trait::async_trait]
pub trait Actor: Send + Sized + 'static {
    type Msg: Send + 'static;

    /// Handle a single message. Return `Err` to stop the actor.
    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()>;
}

/// Runtime context for an actor instance.
///
/// Holds only a weak handle to the mailbox, so an actor whose senders are
/// all dropped still stops.
pub struct Context<A: Actor> {
    addr: mpsc::WeakSender<A::Msg>,
    pub stop: bool,
}

impl<A: Actor> Context<A> {
    /// Get a clone of this actor's `Addr`, e.g. to hand to a spawned task
    /// that reports back later. `None` once every external sender is gone.
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use async_trait::async_trait;
    /// # use tweetgen_actors::actor::{self, Actor, Context};
    /// enum Step { Start, Finish }
    /// struct Relay;
    /// #[async_trait]
    /// impl Actor for Relay {
    ///     type Msg = Step;
    ///     async fn handle(&mut self, msg: Step, ctx: &mut Context<Self>) -> Result<()> {
    ///         match msg {
    ///             Step::Start => {
    ///                 let me = ctx.addr().expect("caller still holds an addr");
    ///                 tokio::spawn(async move {
    ///                     let _ = me.send(Step::Finish).await;
    ///                 });
    ///             }
    ///             Step::Finish => ctx.stop(),
    ///         }
    ///         Ok(())
    ///     }
    /// }
    /// let rt = tokio::runtime::Runtime::new().unwrap();
    /// rt.block_on(async {
    ///     let actor::ActorHandle { addr, task } = actor::spawn_actor(Relay, 2);
    ///     addr.send(Step::Start).await.ok();
    ///     task.await.unwrap().unwrap();
    /// });
    /// ```
    pub fn addr(&self) -> Option<Addr<A>> {
        self.addr.upgrade().map(Addr)
    }

    /// Request a graceful stop after processing the current message.
    pub fn stop(&mut self) {
        self.stop = true;
    }
}

/// Address for sending messages to an actor.
pub struct Addr<A: Actor>(mpsc::Sender<A::Msg>);

/// Manual Clone to avoid unnecessary bounds on `A`/`A::Msg`.
impl<A: Actor> Clone for Addr<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> Addr<A> {
    /// Async send; awaits backpressure. Returns the message if the receiver is dropped.
    pub async fn send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.send(msg).await.map_err(|e| e.0)
    }

    /// Try to send without waiting. Returns the message if the mailbox is full or closed.
    pub fn try_send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.try_send(msg).map_err(|e| e.into_inner())
    }

    /// Blocking send for plain threads outside the runtime. Must not be
    /// called from async code.
    pub fn blocking_send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.blocking_send(msg).map_err(|e| e.0)
    }

    /// Bounded mailbox capacity.
    pub fn capacity(&self) -> usize {
        self.0.max_capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

/// Handle to a running actor task.
pub struct ActorHandle<A: Actor> {
    pub addr: Addr<A>,
    pub task: JoinHandle<anyhow::Result<()>>,
}

/// Spawn an actor with a bounded mailbox.
///
/// Stop conditions:
/// - `handle` returns `Err`
/// - all senders are dropped
/// - `ctx.stop()` is called
///
/// ```
/// # use anyhow::Result;
/// # use async_trait::async_trait;
/// # use tweetgen_actors::actor::{self, Actor, Context};
/// struct Countdown(u8);
/// #[async_trait]
/// impl Actor for Countdown {
///     type Msg = ();
///     async fn handle(&mut self, _msg: (), ctx: &mut Context<Self>) -> Result<()> {
///         self.0 -= 1;
///         if self.0 == 0 {
///             ctx.stop();
///         }
///         Ok(())
///     }
/// }
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let actor::ActorHandle { addr, task } = actor::spawn_actor(Countdown(2), 8);
///     assert_eq!(addr.capacity(), 8);
///     addr.send(()).await.ok();
///     addr.send(()).await.ok();
///     task.await.unwrap().unwrap();
/// });
/// ```
pub fn spawn_actor<A: Actor>(actor: A, capacity: usize) -> ActorHandle<A> {
    spawn_actor_with_shutdown(actor, capacity, None)
}

pub fn spawn_actor_with_shutdown<A: Actor>(
    actor: A,
    capacity: usize,
    shutdown: Option<broadcast::Receiver<()>>,
) -> ActorHandle<A> {
    spawn_actor_reserved::<A>(std::any::type_name::<A>(), capacity)
        .start_with_shutdown(actor, shutdown)
}

async fn run_mailbox<A: Actor>(
    mut actor: A,
    mut rx: mpsc::Receiver<A::Msg>,
    addr: mpsc::WeakSender<A::Msg>,
    mut shutdown: Option<broadcast::Receiver<()>>,
    name: String,
) -> Result<()> {
    let mut ctx = Context { addr, stop: false };

    loop {
        let next = match shutdown.as_mut() {
            Some(shutdown_rx) => tokio::select! {
                _ = shutdown_rx.recv() => break,
                maybe_msg = rx.recv() => maybe_msg,
            },
            None => rx.recv().await,
        };
        let Some(msg) = next else { break };

        // A handler still awaiting I/O is dropped once shutdown fires.
        let handled = match shutdown.as_mut() {
            Some(shutdown_rx) => tokio::select! {
                biased;
                res = actor.handle(msg, &mut ctx) => res,
                _ = shutdown_rx.recv() => {
                    tracing::debug!(actor = %name, "shutdown interrupted handler");
                    break;
                }
            },
            None => actor.handle(msg, &mut ctx).await,
        };
        if let Err(e) = handled {
            tracing::error!(actor = %name, error = ?e, "actor returned error; stopping");
            return Err(e);
        }
        if ctx.stop {
            break;
        }
    }
    tracing::debug!(actor = %name, "actor stopped");
    Ok(())
}

/// Reserved spawn: create mailbox+addr now; start the task later.
pub struct Reserved<A: Actor> {
    name: String,
    addr: Addr<A>,
    rx: mpsc::Receiver<A::Msg>,
}

impl<A: Actor> Reserved<A> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> Addr<A> {
        self.addr.clone()
    }

    /// Start the actor task on the reserved mailbox. Messages sent to the
    /// address before this call are delivered first.
    ///
    /// ```
    /// # use anyhow::Result;
    /// # use async_trait::async_trait;
    /// # use tweetgen_actors::actor::{self, Actor, Context};
    /// # struct Echo;
    /// # #[async_trait]
    /// # impl Actor for Echo {
    /// #     type Msg = &'static str;
    /// #     async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
    /// #         assert_eq!(msg, "early");
    /// #         ctx.stop();
    /// #         Ok(())
    /// #     }
    /// # }
    /// let rt = tokio::runtime::Runtime::new().unwrap();
    /// rt.block_on(async {
    ///     let reserved = actor::spawn_actor_reserved::<Echo>("echo", 4);
    ///     let addr = reserved.addr();
    ///     addr.try_send("early").unwrap();
    ///     let handle = reserved.start(Echo);
    ///     handle.task.await.unwrap().unwrap();
    /// });
    /// ```
    pub fn start(self, actor: A) -> ActorHandle<A> {
        self.start_with_shutdown(actor, None)
    }

    pub fn start_with_shutdown(
        self,
        actor: A,
        shutdown: Option<broadcast::Receiver<()>>,
    ) -> ActorHandle<A> {
        let Reserved { name, addr, rx } = self;
        let task = tokio::spawn(run_mailbox(actor, rx, addr.0.downgrade(), shutdown, name));
        ActorHandle { addr, task }
    }
}

/// Create a mailbox and address now; the actor itself is supplied at start.
pub fn spawn_actor_reserved<A: Actor>(name: impl Into<String>, capacity: usize) -> Reserved<A> {
    let (tx, rx) = mpsc::channel::<A::Msg>(capacity);
    Reserved {
        name: name.into(),
        addr: Addr(tx),
        rx,
    }
}
