#[cfg(test)]
mod tests {
    use crate::archive::{export_as_document, ConversationArchive, ARCHIVE_KEY};
    use crate::conversation::Conversation;
    use crate::event_bus::EventBus;
    use crate::instruction::SystemInstruction;
    use crate::ports::*;
    use crate::session::{drive_turn, ChatSession, SessionState};

    use chat_types::archive::ArchivedConversation;
    use chat_types::config::ChatConfig;
    use chat_types::event::SessionEvent;
    use chat_types::message::{Message, Role};
    use chat_types::ChatError;

    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use async_trait::async_trait;

    fn test_config() -> ChatConfig {
        ChatConfig {
            api_key: "sk-test".to_string(),
            ..ChatConfig::default()
        }
    }

    // ─── Conversation Tests ──────────────────────────────────

    #[test]
    fn test_conversation_new_has_system_head() {
        let convo = Conversation::new("be brief");
        assert_eq!(convo.len(), 1);
        assert_eq!(convo.messages()[0], Message::system("be brief"));
        assert!(convo.is_empty());
    }

    #[test]
    fn test_push_user_appends_at_tail() {
        let mut convo = Conversation::new("sys");
        let before = convo.len();
        convo.push_user("hello there").unwrap();
        assert_eq!(convo.len(), before + 1);
        assert_eq!(
            convo.messages().last().unwrap(),
            &Message::user("hello there")
        );
    }

    #[test]
    fn test_push_user_rejects_blank() {
        let mut convo = Conversation::new("sys");
        for text in ["", "   ", "\n\t"] {
            let err = convo.push_user(text).unwrap_err();
            assert!(matches!(err, ChatError::Validation(_)));
        }
        assert_eq!(convo.len(), 1, "no mutation on rejected input");
    }

    #[test]
    fn test_load_keeps_existing_system_entry() {
        let messages = vec![
            Message::system("captured"),
            Message::user("q"),
            Message::assistant("a"),
        ];
        let convo = Conversation::load(messages, "fallback");
        assert_eq!(convo.messages()[0], Message::system("captured"));
        assert_eq!(convo.len(), 3);
    }

    #[test]
    fn test_load_prepends_system_when_absent() {
        let messages = vec![Message::user("q"), Message::assistant("a")];
        let convo = Conversation::load(messages, "fallback");
        assert_eq!(convo.messages()[0], Message::system("fallback"));
        assert_eq!(convo.len(), 3);
        assert_eq!(convo.messages()[1], Message::user("q"));
    }

    #[test]
    fn test_load_empty_yields_single_system() {
        let convo = Conversation::load(vec![], "fallback");
        assert_eq!(convo.len(), 1);
        assert!(convo.messages()[0].is_system());
    }

    #[test]
    fn test_append_delta_in_arrival_order() {
        let mut convo = Conversation::new("sys");
        convo.push_user("hi").unwrap();
        let handle = convo.begin_reply();

        for fragment in ["Hel", "lo", " world"] {
            convo.append_delta(handle, fragment);
        }
        assert_eq!(convo.messages().last().unwrap().content, "Hello world");
    }

    #[test]
    fn test_append_delta_order_sensitivity() {
        // Applying the same fragments in a different arrival order must
        // yield a different (wrong) result.
        let mut a = Conversation::new("sys");
        a.push_user("hi").unwrap();
        let ha = a.begin_reply();
        for fragment in ["Hel", "lo", " world"] {
            a.append_delta(ha, fragment);
        }

        let mut b = Conversation::new("sys");
        b.push_user("hi").unwrap();
        let hb = b.begin_reply();
        for fragment in [" world", "Hel", "lo"] {
            b.append_delta(hb, fragment);
        }

        assert_eq!(a.messages().last().unwrap().content, "Hello world");
        assert_ne!(
            a.messages().last().unwrap().content,
            b.messages().last().unwrap().content
        );
    }

    #[test]
    fn test_append_delta_stale_handle_is_noop() {
        let mut convo = Conversation::new("sys");
        convo.push_user("one").unwrap();
        let stale = convo.begin_reply();
        convo.append_delta(stale, "first");
        convo.finish_reply(stale);

        convo.push_user("two").unwrap();
        let fresh = convo.begin_reply();
        convo.append_delta(stale, "MUST NOT APPEAR");
        convo.append_delta(fresh, "second");

        let contents: Vec<&str> = convo
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["sys", "one", "first", "two", "second"]);
    }

    #[test]
    fn test_append_delta_after_finish_is_noop() {
        let mut convo = Conversation::new("sys");
        convo.push_user("hi").unwrap();
        let handle = convo.begin_reply();
        convo.append_delta(handle, "done");
        convo.finish_reply(handle);
        convo.append_delta(handle, " more");
        assert_eq!(convo.messages().last().unwrap().content, "done");
    }

    #[test]
    fn test_abort_reply_retains_user_message() {
        let mut convo = Conversation::new("sys");
        convo.push_user("hi").unwrap();
        let pre_turn = convo.len();
        let handle = convo.begin_reply();
        convo.append_delta(handle, "partial text");

        assert!(convo.abort_reply(handle));
        // user message retained, placeholder gone — even mid-stream
        assert_eq!(convo.len(), pre_turn);
        assert_eq!(convo.messages().last().unwrap().role, Role::User);
    }

    #[test]
    fn test_abort_reply_twice_is_noop() {
        let mut convo = Conversation::new("sys");
        convo.push_user("hi").unwrap();
        let handle = convo.begin_reply();
        assert!(convo.abort_reply(handle));
        assert!(!convo.abort_reply(handle));
        assert_eq!(convo.len(), 2);
    }

    #[test]
    fn test_set_system_instruction_rewrites_head_only() {
        let mut convo = Conversation::new("old");
        convo.push_user("q").unwrap();
        convo.set_system_instruction("new");
        assert_eq!(convo.messages()[0], Message::system("new"));
        assert_eq!(convo.messages()[1], Message::user("q"));
        assert_eq!(convo.len(), 2);
    }

    #[test]
    fn test_reset() {
        let mut convo = Conversation::new("sys");
        convo.push_user("q").unwrap();
        let handle = convo.begin_reply();
        convo.append_delta(handle, "a");
        convo.reset("fresh");
        assert_eq!(convo.len(), 1);
        assert_eq!(convo.system_instruction(), "fresh");
        // pending handle cleared by reset
        convo.append_delta(handle, "ghost");
        assert_eq!(convo.len(), 1);
    }

    #[test]
    fn test_visible_messages_excludes_system() {
        let mut convo = Conversation::new("sys");
        convo.push_user("q").unwrap();
        assert_eq!(convo.visible_messages().len(), 1);
        assert!(convo.visible_messages().iter().all(|m| !m.is_system()));
    }

    // ─── SystemInstruction Tests ─────────────────────────────

    #[test]
    fn test_instruction_active_without_override() {
        let instruction = SystemInstruction::new("durable");
        assert_eq!(instruction.active(), "durable");
        assert!(!instruction.has_override());
    }

    #[test]
    fn test_instruction_override_shadows_durable() {
        let mut instruction = SystemInstruction::new("durable");
        instruction.activate_override("captured");
        assert_eq!(instruction.active(), "captured");
        assert_eq!(instruction.durable(), "durable");
    }

    #[test]
    fn test_instruction_end_override_restores_once() {
        let mut instruction = SystemInstruction::new("durable");
        instruction.activate_override("captured");
        assert!(instruction.end_override());
        assert_eq!(instruction.active(), "durable");
        // idempotent: a second end must not corrupt the durable slot
        assert!(!instruction.end_override());
        assert_eq!(instruction.active(), "durable");
        assert_eq!(instruction.durable(), "durable");
    }

    #[test]
    fn test_instruction_set_durable_under_override() {
        let mut instruction = SystemInstruction::new("durable");
        instruction.activate_override("captured");
        instruction.set_durable("updated");
        assert_eq!(instruction.active(), "captured");
        instruction.end_override();
        assert_eq!(instruction.active(), "updated");
    }

    // ─── EventBus Tests ──────────────────────────────────────

    #[test]
    fn test_event_bus_emit_and_drain() {
        let bus = EventBus::new();
        assert!(!bus.has_pending());
        bus.emit(SessionEvent::TurnStart { turn_id: 1 });
        bus.emit(SessionEvent::AssistantDelta {
            token: "hi".to_string(),
        });
        assert!(bus.has_pending());
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();
        bus1.emit(SessionEvent::TurnComplete { turn_id: 1 });
        assert!(bus2.has_pending());
        assert_eq!(bus2.drain().len(), 1);
        assert!(!bus1.has_pending());
    }

    // ─── Mock ports ──────────────────────────────────────────

    /// In-memory store mock implementing the synchronous store port.
    struct MockStore {
        data: RefCell<HashMap<String, String>>,
        subscribers: RefCell<Vec<(String, Box<dyn Fn(Option<String>)>)>>,
    }

    impl MockStore {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                data: RefCell::new(HashMap::new()),
                subscribers: RefCell::new(Vec::new()),
            })
        }

        /// Pretend another tab wrote this key.
        fn simulate_external_change(&self, key: &str, value: Option<&str>) {
            match value {
                Some(v) => {
                    self.data
                        .borrow_mut()
                        .insert(key.to_string(), v.to_string());
                }
                None => {
                    self.data.borrow_mut().remove(key);
                }
            }
            for (watched, callback) in self.subscribers.borrow().iter() {
                if watched == key {
                    callback(value.map(String::from));
                }
            }
        }
    }

    impl StorePort for MockStore {
        fn get(&self, key: &str) -> chat_types::Result<Option<String>> {
            Ok(self.data.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> chat_types::Result<()> {
            self.data
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> chat_types::Result<()> {
            self.data.borrow_mut().remove(key);
            Ok(())
        }

        fn on_external_change(&self, key: &str, callback: Box<dyn Fn(Option<String>)>) {
            self.subscribers
                .borrow_mut()
                .push((key.to_string(), callback));
        }

        fn backend_name(&self) -> &str {
            "mock"
        }
    }

    /// Mock completion client streaming a fixed fragment sequence.
    struct MockCompletion {
        fragments: Vec<&'static str>,
        /// Fail before any delta (request-level transport failure)
        fail_send: bool,
        /// Break the stream after the first delta
        fail_mid_stream: bool,
    }

    impl MockCompletion {
        fn streaming(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                fail_send: false,
                fail_mid_stream: false,
            }
        }
    }

    #[async_trait(?Send)]
    impl CompletionPort for MockCompletion {
        async fn stream_chat(&self, _req: ChatRequest) -> chat_types::Result<ReplyStream> {
            if self.fail_send {
                return Err(ChatError::Transport("HTTP 500: upstream".to_string()));
            }
            let mut events: Vec<StreamEvent> = Vec::new();
            if self.fail_mid_stream {
                events.push(StreamEvent::Delta(self.fragments[0].to_string()));
                events.push(StreamEvent::Error("connection reset".to_string()));
            } else {
                events.extend(
                    self.fragments
                        .iter()
                        .map(|f| StreamEvent::Delta(f.to_string())),
                );
                events.push(StreamEvent::Done);
            }
            Ok(Box::pin(futures::stream::iter(events)))
        }

        async fn chat_completion(&self, _req: ChatRequest) -> chat_types::Result<ChatResponse> {
            Ok(ChatResponse {
                message: Message::assistant(self.fragments.concat()),
                usage: None,
            })
        }
    }

    // Simple single-threaded executor for async tests (not in WASM here)
    fn block_on<F: std::future::Future<Output = T>, T>(f: F) -> T {
        use std::sync::Arc;
        use std::task::{Context, Poll, Wake, Waker};

        struct NoopWaker;
        impl Wake for NoopWaker {
            fn wake(self: Arc<Self>) {}
        }

        let waker = Waker::from(Arc::new(NoopWaker));
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(val) => return val,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    // ─── Session Tests ───────────────────────────────────────

    fn new_session(bus: &EventBus) -> Rc<RefCell<ChatSession>> {
        Rc::new(RefCell::new(ChatSession::new(
            test_config(),
            "durable instruction",
            bus.clone(),
        )))
    }

    #[test]
    fn test_session_initial_state() {
        let bus = EventBus::new();
        let session = ChatSession::new(test_config(), "sys", bus);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.is_busy());
        assert_eq!(session.conversation().len(), 1);
    }

    #[test]
    fn test_begin_turn_rejects_empty_text() {
        let bus = EventBus::new();
        let mut session = ChatSession::new(test_config(), "sys", bus);
        let err = session.begin_turn("   ").unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert_eq!(session.conversation().len(), 1, "no mutation");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_begin_turn_rejects_missing_credential() {
        let bus = EventBus::new();
        let mut session = ChatSession::new(ChatConfig::default(), "sys", bus);
        let err = session.begin_turn("hello").unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert_eq!(session.conversation().len(), 1, "no mutation");
    }

    #[test]
    fn test_begin_turn_rejects_while_awaiting() {
        let bus = EventBus::new();
        let mut session = ChatSession::new(test_config(), "sys", bus);
        let _ = session.begin_turn("first").unwrap();
        let err = session.begin_turn("second").unwrap_err();
        assert!(matches!(err, ChatError::Busy));
        let err = session.new_conversation().unwrap_err();
        assert!(matches!(err, ChatError::Busy));
    }

    #[test]
    fn test_begin_turn_request_excludes_placeholder() {
        let bus = EventBus::new();
        let mut session = ChatSession::new(test_config(), "sys", bus);
        let (_handle, request) = session.begin_turn("hello").unwrap();
        // system + user in the request; placeholder only in the model
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages.last().unwrap().role, Role::User);
        assert_eq!(session.conversation().len(), 3);
        assert_eq!(request.model, "deepseek-chat");
    }

    #[test]
    fn test_drive_turn_assembles_streamed_reply() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let client = MockCompletion::streaming(vec!["Hel", "lo", " world"]);

        block_on(drive_turn(&session, &client, "hi")).unwrap();

        let session = session.borrow();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.conversation().len(), 3);
        let reply = session.conversation().messages().last().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Hello world");

        let events = bus.drain();
        assert!(matches!(events.first(), Some(SessionEvent::TurnStart { .. })));
        assert!(matches!(events.last(), Some(SessionEvent::TurnComplete { .. })));
        let deltas = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::AssistantDelta { .. }))
            .count();
        assert_eq!(deltas, 3);
    }

    #[test]
    fn test_drive_turn_send_failure_rolls_back_placeholder() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let pre_turn = session.borrow().conversation().len();
        let client = MockCompletion {
            fail_send: true,
            ..MockCompletion::streaming(vec![])
        };

        let result = block_on(drive_turn(&session, &client, "hi"));
        assert!(matches!(result, Err(ChatError::Transport(_))));

        let session = session.borrow();
        // user message retained, placeholder removed
        assert_eq!(session.conversation().len(), pre_turn + 1);
        assert_eq!(
            session.conversation().messages().last().unwrap().role,
            Role::User
        );
        assert_eq!(session.state(), SessionState::Idle);

        let events = bus.drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::TurnFailed { .. })));
    }

    #[test]
    fn test_drive_turn_mid_stream_failure_drops_partial_reply() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let client = MockCompletion {
            fail_mid_stream: true,
            ..MockCompletion::streaming(vec!["partial"])
        };

        let result = block_on(drive_turn(&session, &client, "hi"));
        assert!(result.is_err());

        let session = session.borrow();
        // no partial assistant text is left visible
        assert_eq!(
            session.conversation().messages().last().unwrap().role,
            Role::User
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_drive_turn_multiple_turns_accumulate() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let client = MockCompletion::streaming(vec!["reply"]);

        block_on(drive_turn(&session, &client, "turn 1")).unwrap();
        block_on(drive_turn(&session, &client, "turn 2")).unwrap();

        // system + (user + assistant) * 2
        assert_eq!(session.borrow().conversation().len(), 5);
    }

    #[test]
    fn test_new_conversation_ends_override_once() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let entry = ArchivedConversation {
            id: "a1".to_string(),
            name: "saved".to_string(),
            messages: vec![Message::system("captured"), Message::user("q")],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            captured_system_instruction: Some("captured".to_string()),
            auto_saved: false,
        };

        {
            let mut s = session.borrow_mut();
            s.select_archived(&entry).unwrap();
            assert!(s.instruction().has_override());
            assert_eq!(s.conversation().system_instruction(), "captured");

            s.new_conversation().unwrap();
            assert!(!s.instruction().has_override());
            assert_eq!(s.conversation().system_instruction(), "durable instruction");

            // ending again must not corrupt the durable slot
            s.new_conversation().unwrap();
            assert_eq!(s.instruction().durable(), "durable instruction");
        }
    }

    #[test]
    fn test_select_archived_without_captured_instruction() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let entry = ArchivedConversation {
            id: "a2".to_string(),
            name: "saved".to_string(),
            messages: vec![Message::user("q"), Message::assistant("a")],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            captured_system_instruction: None,
            auto_saved: false,
        };

        let mut s = session.borrow_mut();
        s.select_archived(&entry).unwrap();
        assert!(!s.instruction().has_override());
        // system entry synthesized from the durable instruction
        assert_eq!(s.conversation().system_instruction(), "durable instruction");
        assert_eq!(s.conversation().len(), 3);
        assert_eq!(s.active_archive_id(), Some("a2"));
    }

    #[test]
    fn test_archive_entry_deleted_resets_active_conversation() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let entry = ArchivedConversation {
            id: "a3".to_string(),
            name: "saved".to_string(),
            messages: vec![Message::system("captured"), Message::user("q")],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            captured_system_instruction: Some("captured".to_string()),
            auto_saved: false,
        };

        let mut s = session.borrow_mut();
        s.select_archived(&entry).unwrap();
        s.archive_entry_deleted("a3");

        assert_eq!(s.conversation().len(), 1);
        assert_eq!(s.conversation().system_instruction(), "durable instruction");
        assert!(s.active_archive_id().is_none());
        assert!(!s.instruction().has_override());
    }

    #[test]
    fn test_archive_entry_deleted_ignores_other_ids() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        {
            let mut s = session.borrow_mut();
            s.begin_turn("hello").map(|_| ()).unwrap();
        }
        session.borrow_mut().archive_entry_deleted("unrelated");
        // conversation untouched
        assert_eq!(session.borrow().conversation().len(), 3);
    }

    #[test]
    fn test_set_durable_instruction_rewrites_head() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let mut s = session.borrow_mut();
        s.set_durable_instruction("updated");
        assert_eq!(s.conversation().system_instruction(), "updated");
    }

    #[test]
    fn test_set_durable_instruction_does_not_break_override() {
        let bus = EventBus::new();
        let session = new_session(&bus);
        let entry = ArchivedConversation {
            id: "a4".to_string(),
            name: "saved".to_string(),
            messages: vec![Message::system("captured")],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            captured_system_instruction: Some("captured".to_string()),
            auto_saved: false,
        };

        let mut s = session.borrow_mut();
        s.select_archived(&entry).unwrap();
        s.set_durable_instruction("updated");
        // the override stays active in the conversation
        assert_eq!(s.conversation().system_instruction(), "captured");
        s.new_conversation().unwrap();
        assert_eq!(s.conversation().system_instruction(), "updated");
    }

    // ─── Archive Tests ───────────────────────────────────────

    #[test]
    fn test_archive_list_empty_store() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store);
        assert!(archive.list().is_empty());
    }

    #[test]
    fn test_archive_save_and_list() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store.clone());
        let messages = vec![Message::system("s"), Message::user("q")];

        let saved = archive
            .save(&messages, "My chat", Some("s".to_string()))
            .unwrap();
        assert!(!saved.id.is_empty());

        let entries = archive.list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "My chat");
        assert_eq!(entries[0].messages, messages);
        assert_eq!(
            entries[0].captured_system_instruction.as_deref(),
            Some("s")
        );
    }

    #[test]
    fn test_archive_save_rejects_blank_name() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store.clone());
        let err = archive.save(&[], "   ", None).unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert!(store.get(ARCHIVE_KEY).unwrap().is_none(), "no write");
    }

    #[test]
    fn test_archive_ids_unique_for_rapid_saves() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store);
        // Saves landing on the same millisecond get a collision suffix.
        let a = archive.save(&[], "one", None).unwrap();
        let b = archive.save(&[], "two", None).unwrap();
        let c = archive.save(&[], "three", None).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_archive_preserves_insertion_order() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store);
        archive.save(&[], "first", None).unwrap();
        archive.save(&[], "second", None).unwrap();
        let names: Vec<String> =
            archive.list().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_archive_delete() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store);
        let saved = archive.save(&[], "doomed", None).unwrap();
        archive.save(&[], "kept", None).unwrap();

        archive.delete(&saved.id).unwrap();
        let entries = archive.list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "kept");
    }

    #[test]
    fn test_archive_delete_unknown_id_is_noop() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store);
        archive.save(&[], "kept", None).unwrap();
        archive.delete("no-such-id").unwrap();
        assert_eq!(archive.list().len(), 1);
    }

    #[test]
    fn test_archive_corrupt_data_treated_as_empty() {
        let store = MockStore::new();
        store.set(ARCHIVE_KEY, "{{ not json").unwrap();
        let archive = ConversationArchive::new(store.clone());
        assert!(archive.list().is_empty());
        // a save afterwards recovers with a fresh list
        archive.save(&[], "fresh", None).unwrap();
        assert_eq!(archive.list().len(), 1);
    }

    #[test]
    fn test_save_then_select_round_trip() {
        let store = MockStore::new();
        let archive = ConversationArchive::new(store);
        let bus = EventBus::new();
        let session = new_session(&bus);

        let messages = vec![
            Message::system("I"),
            Message::user("q"),
            Message::assistant("a"),
        ];
        let saved = archive
            .save(&messages, "N", Some("I".to_string()))
            .unwrap();

        let entry = archive
            .list()
            .into_iter()
            .find(|e| e.id == saved.id)
            .unwrap();
        let mut s = session.borrow_mut();
        s.select_archived(&entry).unwrap();

        assert_eq!(s.conversation().messages(), messages.as_slice());
        assert!(s.instruction().has_override());
        assert_eq!(s.instruction().active(), "I");

        s.new_conversation().unwrap();
        assert_eq!(s.instruction().active(), "durable instruction");
    }

    // ─── Export Tests ────────────────────────────────────────

    #[test]
    fn test_export_excludes_system_entry() {
        let messages = vec![
            Message::system("sys"),
            Message::user("q"),
            Message::assistant("a"),
        ];
        let doc = export_as_document("My chat", &messages);
        assert_eq!(doc.name, "My chat");
        assert_eq!(doc.messages.len(), 2);
        assert!(doc.messages.iter().all(|m| !m.is_system()));
        assert!(!doc.date.is_empty());
    }

    #[test]
    fn test_export_system_only_conversation_is_empty() {
        let doc = export_as_document("empty", &[Message::system("sys")]);
        assert!(doc.messages.is_empty());
    }

    // ─── Store subscription test ─────────────────────────────

    #[test]
    fn test_store_external_change_notifies_subscriber() {
        let store = MockStore::new();
        let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.on_external_change(
            "chat.instruction",
            Box::new(move |value| sink.borrow_mut().push(value)),
        );

        store.simulate_external_change("chat.instruction", Some("from other tab"));
        store.simulate_external_change("unrelated.key", Some("x"));
        store.simulate_external_change("chat.instruction", None);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].as_deref(), Some("from other tab"));
        assert!(seen[1].is_none());
    }
}
