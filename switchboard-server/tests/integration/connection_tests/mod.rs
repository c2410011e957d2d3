mod test_disconnect_hangs_up_room;
mod test_duplicate_connection_rejected;
mod test_reconnect_after_disconnect;
