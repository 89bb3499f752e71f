//! Room registry
//!
//! The authoritative map of active rooms to their members. Invariants:
//! - every registered room has at least one member
//! - a connection is a member of at most one room
//! - the code generator's active set equals the set of registered codes
//!
//! Mutations take `&mut self`; the registry is owned by the `LobbyServer`
//! actor so all operations are applied one at a time.

use std::collections::HashMap;

use tracing::debug;

use crate::code::CodeGenerator;
use crate::error::RegistryError;
use crate::room::{Member, Room};
use crate::types::{ConnectionId, RoomCode};

/// Result of removing a connection from its room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Room the connection was removed from
    pub room_code: RoomCode,
    /// True if the room became empty and was deleted
    pub room_closed: bool,
}

pub struct RoomRegistry {
    /// All active rooms: RoomCode -> Room
    rooms: HashMap<RoomCode, Room>,
    /// Connection to room mapping for fast lookup: ConnectionId -> RoomCode
    memberships: HashMap<ConnectionId, RoomCode>,
    codes: CodeGenerator,
}

impl RoomRegistry {
    pub fn new(codes: CodeGenerator) -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            codes,
        }
    }

    /// Create a room whose only member is `creator`
    ///
    /// A creator already sitting in another room is moved out of it first.
    /// A creator alone in its room vacates it before drawing, so that
    /// room's code is available again. Otherwise an exhausted code space
    /// fails without changing anything.
    pub fn create_room(&mut self, creator: Member) -> Result<RoomCode, RegistryError> {
        let sole_member = self
            .memberships
            .get(&creator.id)
            .and_then(|code| self.rooms.get(code))
            .is_some_and(|room| room.member_count() == 1);
        if sole_member {
            self.remove_connection(creator.id);
        }

        let code = self.codes.generate()?;
        self.remove_connection(creator.id);

        self.memberships.insert(creator.id, code.clone());
        self.rooms.insert(code.clone(), Room::new(code.clone(), creator));
        debug!(room_code = %code, rooms = self.rooms.len(), "Room registered");
        Ok(code)
    }

    /// Append `member` to an active room and return the updated member list
    ///
    /// An unknown code fails with `RoomNotFound` without touching any state.
    /// Joining the room the connection is already in changes nothing.
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        member: Member,
    ) -> Result<Vec<Member>, RegistryError> {
        if !self.rooms.contains_key(code) {
            return Err(RegistryError::RoomNotFound(code.clone()));
        }

        if self.memberships.get(&member.id) != Some(code) {
            // Target room survives: the member is not in it.
            self.remove_connection(member.id);

            let Some(room) = self.rooms.get_mut(code) else {
                return Err(RegistryError::RoomNotFound(code.clone()));
            };
            self.memberships.insert(member.id, code.clone());
            room.push(member);
        }

        self.get_members(code)
    }

    /// Snapshot of a room's members in join order
    pub fn get_members(&self, code: &RoomCode) -> Result<Vec<Member>, RegistryError> {
        self.rooms
            .get(code)
            .map(|room| room.members().to_vec())
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))
    }

    /// Remove a connection from whichever room holds it
    ///
    /// Deletes the room and releases its code if it became empty.
    /// Unknown connections are a no-op returning `None`.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Departure> {
        let code = self.memberships.remove(&id)?;
        let room = self.rooms.get_mut(&code)?;
        room.remove_connection(id);

        let room_closed = room.is_empty();
        if room_closed {
            self.rooms.remove(&code);
            self.codes.release(&code);
            debug!(room_code = %code, rooms = self.rooms.len(), "Room deleted (empty)");
        }

        Some(Departure {
            room_code: code,
            room_closed,
        })
    }

    /// Code of the room a connection is in, if any
    pub fn room_of(&self, id: ConnectionId) -> Option<&RoomCode> {
        self.memberships.get(&id)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self) -> usize {
        self.memberships.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::CodeConfig;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(CodeGenerator::new(CodeConfig::default()))
    }

    fn tiny_registry() -> RoomRegistry {
        let config = CodeConfig::new("01", 1, 4).unwrap();
        RoomRegistry::new(CodeGenerator::with_rng(config, StdRng::seed_from_u64(1)))
    }

    fn member(name: &str) -> Member {
        Member::new(ConnectionId::new(), name)
    }

    #[test]
    fn test_create_room_contains_only_creator() {
        let mut registry = registry();
        let alice = member("Alice");

        let code = registry.create_room(alice.clone()).unwrap();

        assert_eq!(registry.get_members(&code).unwrap(), vec![alice.clone()]);
        assert_eq!(registry.room_of(alice.id), Some(&code));
    }

    #[test]
    fn test_active_codes_are_distinct() {
        let mut registry = registry();
        let codes: HashSet<RoomCode> = (0..200)
            .map(|i| registry.create_room(member(&format!("user{i}"))).unwrap())
            .collect();

        assert_eq!(codes.len(), 200);
        assert_eq!(registry.room_count(), 200);
    }

    #[test]
    fn test_join_unknown_room_does_not_mutate() {
        let mut registry = registry();
        let alice = member("Alice");
        let code = registry.create_room(alice.clone()).unwrap();
        let bob = member("Bob");

        let unknown = RoomCode::parse("nope");
        let result = registry.join_room(&unknown, bob.clone());

        assert_eq!(result, Err(RegistryError::RoomNotFound(unknown)));
        assert_eq!(registry.room_count(), 1);
        assert_eq!(registry.get_members(&code).unwrap(), vec![alice]);
        assert!(registry.room_of(bob.id).is_none());
    }

    #[test]
    fn test_join_appends_in_order() {
        let mut registry = registry();
        let alice = member("Alice");
        let bob = member("Bob");
        let carol = member("Carol");
        let code = registry.create_room(alice.clone()).unwrap();

        let after_bob = registry.join_room(&code, bob.clone()).unwrap();
        assert_eq!(after_bob, vec![alice.clone(), bob.clone()]);

        let after_carol = registry.join_room(&code, carol.clone()).unwrap();
        assert_eq!(after_carol, vec![alice, bob, carol]);
    }

    #[test]
    fn test_rejoin_same_room_is_noop() {
        let mut registry = registry();
        let alice = member("Alice");
        let bob = member("Bob");
        let code = registry.create_room(alice.clone()).unwrap();
        registry.join_room(&code, bob.clone()).unwrap();

        let members = registry.join_room(&code, alice.clone()).unwrap();

        assert_eq!(members, vec![alice, bob]);
    }

    #[test]
    fn test_join_moves_connection_between_rooms() {
        let mut registry = registry();
        let alice = member("Alice");
        let bob = member("Bob");
        let first = registry.create_room(alice.clone()).unwrap();
        let second = registry.create_room(bob.clone()).unwrap();

        registry.join_room(&second, alice.clone()).unwrap();

        // Alice's old room emptied and was deleted
        assert!(!registry.contains(&first));
        assert_eq!(registry.room_of(alice.id), Some(&second));
        assert_eq!(registry.get_members(&second).unwrap(), vec![bob, alice]);
    }

    #[test]
    fn test_create_moves_creator_out_of_old_room() {
        let mut registry = registry();
        let alice = member("Alice");
        let bob = member("Bob");
        let first = registry.create_room(alice.clone()).unwrap();
        registry.join_room(&first, bob.clone()).unwrap();

        let second = registry.create_room(bob.clone()).unwrap();

        assert_ne!(first, second);
        assert_eq!(registry.get_members(&first).unwrap(), vec![alice]);
        assert_eq!(registry.get_members(&second).unwrap(), vec![bob]);
        assert_eq!(registry.member_count(), 2);
    }

    #[test]
    fn test_remove_connection_is_idempotent() {
        let mut registry = registry();
        let alice = member("Alice");
        let bob = member("Bob");
        let code = registry.create_room(alice.clone()).unwrap();
        registry.join_room(&code, bob.clone()).unwrap();

        let first = registry.remove_connection(bob.id);
        assert_eq!(
            first,
            Some(Departure {
                room_code: code.clone(),
                room_closed: false,
            })
        );

        assert_eq!(registry.remove_connection(bob.id), None);
        assert_eq!(registry.get_members(&code).unwrap(), vec![alice]);
    }

    #[test]
    fn test_last_member_leaving_deletes_room() {
        let mut registry = registry();
        let alice = member("Alice");
        let code = registry.create_room(alice.clone()).unwrap();

        let departure = registry.remove_connection(alice.id).unwrap();

        assert!(departure.room_closed);
        assert!(!registry.contains(&code));
        assert_eq!(
            registry.get_members(&code),
            Err(RegistryError::RoomNotFound(code))
        );
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_released_code_reusable_immediately() {
        let mut registry = tiny_registry();
        let alice = member("Alice");
        let bob = member("Bob");
        let first = registry.create_room(alice.clone()).unwrap();
        let second = registry.create_room(bob).unwrap();
        assert_ne!(first, second);

        // Both codes of the space are taken
        assert!(matches!(
            registry.create_room(member("Carol")),
            Err(RegistryError::CodeSpaceExhausted { capacity: 2 })
        ));

        registry.remove_connection(alice.id);
        let reused = registry.create_room(member("Carol")).unwrap();
        assert_eq!(reused, first);
    }

    #[test]
    fn test_sole_member_recreate_reuses_vacated_code() {
        let mut registry = tiny_registry();
        let alice = member("Alice");
        let first = registry.create_room(alice.clone()).unwrap();
        registry.create_room(member("Bob")).unwrap();

        // Space is full, but Alice leaving her own room frees its code
        let recreated = registry.create_room(alice.clone()).unwrap();

        assert_eq!(recreated, first);
        assert_eq!(registry.get_members(&recreated).unwrap(), vec![alice]);
        assert_eq!(registry.room_count(), 2);
    }

    #[test]
    fn test_exhausted_create_leaves_shared_room_intact() {
        let mut registry = tiny_registry();
        let alice = member("Alice");
        let bob = member("Bob");
        let first = registry.create_room(alice.clone()).unwrap();
        registry.join_room(&first, bob.clone()).unwrap();
        registry.create_room(member("Carol")).unwrap();

        assert!(matches!(
            registry.create_room(bob.clone()),
            Err(RegistryError::CodeSpaceExhausted { capacity: 2 })
        ));
        assert_eq!(registry.room_of(bob.id), Some(&first));
        assert_eq!(registry.get_members(&first).unwrap(), vec![alice, bob]);
    }
}
