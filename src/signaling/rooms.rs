use std::collections::HashMap;

use super::types::{PeerId, RoomId};

/// Membership directory: room id to members in join order.
///
/// A room exists iff it has at least one member. The entry is created by the
/// first `add_member` and deleted the instant the last member is removed, so
/// a later join with the same name starts from an empty room.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<RoomId, Vec<PeerId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member, creating the room on its first member. Ignored if
    /// the identity is already listed, so a member can never appear twice.
    pub fn add_member(&mut self, room: RoomId, id: PeerId) {
        let members = self.rooms.entry(room).or_default();
        if !members.contains(&id) {
            members.push(id);
        }
    }

    /// Remove a member, deleting the room entry once it empties. Ignored
    /// for an absent room or member.
    pub fn remove_member(&mut self, room: &RoomId, id: PeerId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.retain(|member| *member != id);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    /// All members of a room other than `id`, in join order. Empty if the
    /// room does not exist.
    pub fn members_except(&self, room: &RoomId, id: PeerId) -> Vec<PeerId> {
        match self.rooms.get(room) {
            Some(members) => members.iter().copied().filter(|member| *member != id).collect(),
            None => Vec::new(),
        }
    }

    /// Whether the room currently exists (i.e. has at least one member).
    pub fn contains(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> PeerId {
        PeerId::from_seq(n)
    }

    #[test]
    fn first_member_creates_the_room() {
        let mut directory = RoomDirectory::new();
        let room = RoomId::from("r1");
        assert!(!directory.contains(&room));

        directory.add_member(room.clone(), id(1));
        assert!(directory.contains(&room));
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let mut directory = RoomDirectory::new();
        let room = RoomId::from("r1");
        directory.add_member(room.clone(), id(1));
        directory.add_member(room.clone(), id(1));

        assert_eq!(directory.members_except(&room, id(2)), vec![id(1)]);
    }

    #[test]
    fn members_except_preserves_join_order() {
        let mut directory = RoomDirectory::new();
        let room = RoomId::from("r1");
        directory.add_member(room.clone(), id(3));
        directory.add_member(room.clone(), id(1));
        directory.add_member(room.clone(), id(2));

        assert_eq!(directory.members_except(&room, id(9)), vec![id(3), id(1), id(2)]);
    }

    #[test]
    fn members_except_excludes_the_asker() {
        let mut directory = RoomDirectory::new();
        let room = RoomId::from("r1");
        directory.add_member(room.clone(), id(1));
        directory.add_member(room.clone(), id(2));

        assert_eq!(directory.members_except(&room, id(1)), vec![id(2)]);
    }

    #[test]
    fn members_except_of_absent_room_is_empty() {
        let directory = RoomDirectory::new();
        assert!(directory.members_except(&RoomId::from("nope"), id(1)).is_empty());
    }

    #[test]
    fn last_member_removal_deletes_the_room() {
        let mut directory = RoomDirectory::new();
        let room = RoomId::from("r1");
        directory.add_member(room.clone(), id(1));
        directory.add_member(room.clone(), id(2));

        directory.remove_member(&room, id(1));
        assert!(directory.contains(&room));

        directory.remove_member(&room, id(2));
        assert!(!directory.contains(&room));
    }

    #[test]
    fn remove_from_absent_room_is_a_noop() {
        let mut directory = RoomDirectory::new();
        directory.remove_member(&RoomId::from("nope"), id(1));
        assert!(!directory.contains(&RoomId::from("nope")));
    }

    #[test]
    fn remove_of_absent_member_keeps_the_room() {
        let mut directory = RoomDirectory::new();
        let room = RoomId::from("r1");
        directory.add_member(room.clone(), id(1));

        directory.remove_member(&room, id(2));
        assert!(directory.contains(&room));
        assert_eq!(directory.members_except(&room, id(9)), vec![id(1)]);
    }

    #[test]
    fn rooms_do_not_share_members() {
        let mut directory = RoomDirectory::new();
        directory.add_member(RoomId::from("r1"), id(1));
        directory.add_member(RoomId::from("r2"), id(2));

        assert_eq!(directory.members_except(&RoomId::from("r1"), id(9)), vec![id(1)]);
        assert_eq!(directory.members_except(&RoomId::from("r2"), id(9)), vec![id(2)]);
    }
}
