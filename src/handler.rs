use crate::{
    config::Config, context::Context, event::Event, game::StageTable,
    persistent_state::PersistentState, volatile_state::VolatileState,
};
use serenity::all::{Guild, GuildId, Interaction, Member, Message, Ready, User};
use tokio::sync::RwLock;

/// Discord event handler
pub struct Handler {
    cfg: RwLock<Config>,
    pstate: RwLock<PersistentState>,
    vstate: RwLock<VolatileState>,
    stages: RwLock<StageTable>,
}

impl<'a> Handler {
    pub fn new(
        cfg: Config,
        pstate: PersistentState,
        vstate: VolatileState,
        stages: StageTable,
    ) -> Self {
        Self {
            cfg: RwLock::new(cfg),
            pstate: RwLock::new(pstate),
            vstate: RwLock::new(vstate),
            stages: RwLock::new(stages),
        }
    }

    fn ctx(&'a self, discord_ctx: &'a serenity::all::Context) -> Context<'a> {
        Context {
            cfg: &self.cfg,
            pstate: &self.pstate,
            vstate: &self.vstate,
            stages: &self.stages,
            cache: &discord_ctx.cache,
            http: &discord_ctx.http,
            cache_http: discord_ctx,
        }
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        Event::Ready(ready).handle(self.ctx(&discord_ctx)).await;
    }

    async fn message(&self, discord_ctx: serenity::all::Context, msg: Message) {
        Event::Message(msg).handle(self.ctx(&discord_ctx)).await;
    }

    async fn interaction_create(&self, discord_ctx: serenity::all::Context, interaction: Interaction) {
        // Only components are ours; slash commands are never registered.
        if let Interaction::Component(component) = interaction {
            Event::Component(component)
                .handle(self.ctx(&discord_ctx))
                .await;
        }
    }

    async fn guild_member_addition(&self, discord_ctx: serenity::all::Context, new_member: Member) {
        Event::MemberAdd(new_member)
            .handle(self.ctx(&discord_ctx))
            .await;
    }

    async fn guild_member_removal(
        &self,
        discord_ctx: serenity::all::Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        Event::MemberRemove { guild_id, user }
            .handle(self.ctx(&discord_ctx))
            .await;
    }

    async fn guild_create(
        &self,
        discord_ctx: serenity::all::Context,
        guild: Guild,
        is_new: Option<bool>,
    ) {
        Event::GuildCreate { guild, is_new }
            .handle(self.ctx(&discord_ctx))
            .await;
    }
}
